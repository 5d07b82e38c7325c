//! Tokens: scoped ranges of a line
//!
//! A token binds a [`Range`] to a scope name. The scope is resolved to a
//! color pair by a [`ColorScheme`](crate::color::ColorScheme); an empty
//! scope means "no color" and such tokens are transparent when layers
//! are merged.

use std::fmt;

use super::range::Range;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Token {
    pub range: Range,
    pub scope: String,
}

impl Token {
    pub fn new(range: Range, scope: impl Into<String>) -> Self {
        Self {
            range,
            scope: scope.into(),
        }
    }

    /// Token with no color assigned yet
    pub fn uncolored(range: Range) -> Self {
        Self {
            range,
            scope: String::new(),
        }
    }

    /// Whether a scope has been assigned
    pub fn is_colored(&self) -> bool {
        !self.scope.is_empty()
    }

    /// Text of `line` covered by this token
    pub fn text<'t>(&self, line: &'t str) -> &'t str {
        self.range.slice(line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.range, self.scope)
    }
}

/// Order used for syntax token lists: ascending start, longer range first
/// on equal starts so that a containing token precedes what it contains.
pub fn sort_tokens(tokens: &mut [Token]) {
    tokens.sort_by(|x, y| {
        x.range
            .start
            .cmp(&y.range.start)
            .then_with(|| y.range.end.cmp(&x.range.end))
    });
}
