//! Syntax engine
//!
//! Turns a log line into scoped tokens:
//! - [`Range`] and [`Token`] describe spans of a line
//! - [`SyntaxRule`] runs one regex against a previously bound group
//! - [`Syntax`] chains rules and carries its own tests
//! - [`SyntaxCollection`] picks the first syntax that recognizes a line

mod range;
mod token;
mod rules;
mod definition;
mod collection;
pub mod builtin;

pub use range::Range;
pub use token::{sort_tokens, Token};
pub use rules::{
    escaped_alternation, GroupName, ParsingState, SearchMode, SyntaxRule, GROUP_GROUP,
    GROUP_LINE, GROUP_MATCH,
};
pub use definition::{Syntax, SyntaxTest};
pub use collection::SyntaxCollection;
