//! Merging of token layers into one flat, non-overlapping list
//!
//! Layers are added top-first: everything already in the result list
//! covers what is added after it. A lower token only fills the gaps the
//! upper tokens leave inside its range.

use tracing::trace;

use crate::color::ColorScheme;
use crate::syntax::{Range, Token};

/// Add `lower` underneath the tokens already in `tokens`
///
/// `tokens` must be sorted and non-overlapping; it stays that way.
/// The parts of `lower` not covered by an existing token are inserted
/// with `lower`'s scope.
pub fn add_lower_token(tokens: &mut Vec<Token>, lower: &Token) {
    let mut cursor = lower.range.start;
    let end = lower.range.end;
    if cursor >= end {
        return;
    }
    let mut i = 0;
    while i < tokens.len() {
        let upper = tokens[i].range;
        if upper.start <= cursor {
            if upper.end >= end {
                return;
            }
            cursor = cursor.max(upper.end);
        } else if upper.start >= end {
            break;
        } else {
            tokens.insert(i, Token::new(Range::new(cursor, upper.start), lower.scope.clone()));
            i += 1;
            cursor = upper.end;
        }
        i += 1;
    }
    if cursor < end {
        tokens.insert(i, Token::new(Range::new(cursor, end), lower.scope.clone()));
    }
}

/// Add a sorted syntax token list underneath `tokens`
///
/// Later syntax tokens are nested in (or follow) earlier ones, so they
/// are added first. Uncolored tokens are transparent and skipped.
pub fn merge_syntax_tokens(tokens: &mut Vec<Token>, syntax_tokens: &[Token]) {
    for token in syntax_tokens.iter().rev() {
        if token.is_colored() {
            add_lower_token(tokens, token);
        }
    }
}

/// Drop tokens whose scope the scheme does not know
pub fn filter_tokens_by_scheme(tokens: &mut Vec<Token>, scheme: &ColorScheme) {
    let before = tokens.len();
    tokens.retain(|t| t.is_colored() && scheme.has_scope(&t.scope));
    if tokens.len() != before {
        trace!(dropped = before - tokens.len(), "Filtered tokens with unknown scopes");
    }
}

/// Overlay stack for a single line
///
/// Typical order, top first: selection, quick find, highlights, then the
/// syntax tokens passed to [`compose`](Self::compose).
#[derive(Debug, Clone, Default)]
pub struct LineLayers {
    tokens: Vec<Token>,
}

impl LineLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the ones already pushed
    pub fn push_layer(&mut self, layer: &[Token]) -> &mut Self {
        for token in layer {
            add_lower_token(&mut self.tokens, token);
        }
        self
    }

    /// Add the selection as the topmost remaining layer
    pub fn push_selection(&mut self, selection: Range) -> &mut Self {
        if !selection.is_empty() {
            add_lower_token(
                &mut self.tokens,
                &Token::new(selection, crate::color::SELECTION),
            );
        }
        self
    }

    /// Merge the syntax tokens underneath and return the final list
    ///
    /// Syntax tokens with a scope `scheme` cannot color are dropped before
    /// merging, so the enclosing token shows through in their place.
    pub fn compose(mut self, syntax_tokens: &[Token], scheme: &ColorScheme) -> Vec<Token> {
        let mut syntax = syntax_tokens.to_vec();
        filter_tokens_by_scheme(&mut syntax, scheme);
        merge_syntax_tokens(&mut self.tokens, &syntax);
        self.tokens
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
