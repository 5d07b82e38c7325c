//! loglight - rule-based line highlighting for log viewers
//!
//! A line goes through three stages:
//! 1. [`SyntaxCollection::parse`] splits it into scoped tokens
//! 2. [`LineLayers`] stacks selection, quick find and highlight patterns
//!    on top and flattens everything into non-overlapping tokens
//! 3. a [`ColorScheme`] turns each token's scope into colors
//!
//! Syntaxes and color schemes come from YAML documents loaded by
//! [`StructConfig`]; [`ConfigStore`] holds the active configuration.

pub mod color;
pub mod colorizer;
pub mod config;
pub mod config_node;
pub mod error;
pub mod highlights;
pub mod quick_find;
pub mod store;
pub mod struct_config;
pub mod syntax;

pub use color::{Color, ColorScheme, TextColor};
pub use colorizer::{add_lower_token, filter_tokens_by_scheme, merge_syntax_tokens, LineLayers};
pub use config::Settings;
pub use config_node::{ConfigDocument, ConfigNode};
pub use error::{ConfigError, Error, Location, Result};
pub use highlights::Highlights;
pub use quick_find::QuickFindPattern;
pub use store::{ConfigStore, Notice};
pub use struct_config::{ConfigFiles, LoadOptions, ScopeIssue, StructConfig};
pub use syntax::{Range, Syntax, SyntaxCollection, SyntaxRule, Token};
