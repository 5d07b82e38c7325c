//! Colors and color schemes

mod style;
mod scheme;
pub mod builtin;

pub use style::{Color, TextColor};
pub use scheme::{
    is_abstract, load_all, read_color, ColorScheme, ColorSchemeMap, SchemeDefinitions,
    ABSTRACT_PREFIX, HIGHLIGHT_COUNT, QUICK_FIND, SELECTION, TEXT,
};
