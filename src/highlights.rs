//! User highlight patterns
//!
//! Literal strings the user asked to highlight, each assigned to one of
//! [`HIGHLIGHT_COUNT`] color slots. A slot's literals compile into a single
//! escaped alternation; changing a slot only recompiles that slot.

use regex::Regex;
use tracing::debug;

use crate::color::{ColorScheme, HIGHLIGHT_COUNT};
use crate::colorizer::add_lower_token;
use crate::error::{Error, Result};
use crate::syntax::{escaped_alternation, Range, Token};

#[derive(Debug, Clone, Default)]
struct Slot {
    patterns: Vec<String>,
    regex: Option<Regex>,
}

impl Slot {
    fn recompile(&mut self) -> Result<()> {
        self.regex = if self.patterns.is_empty() {
            None
        } else {
            Some(Regex::new(&escaped_alternation(&self.patterns))?)
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Highlights {
    slots: [Slot; HIGHLIGHT_COUNT],
}

impl Highlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `pattern` with the colors of `slot`
    ///
    /// A pattern already present in another slot moves to `slot`.
    pub fn add_pattern(&mut self, pattern: &str, slot: usize) -> Result<()> {
        if slot >= HIGHLIGHT_COUNT {
            return Err(Error::HighlightSlot(slot));
        }
        if pattern.is_empty() || self.slots[slot].patterns.iter().any(|p| p == pattern) {
            return Ok(());
        }
        self.remove_pattern(pattern)?;
        self.slots[slot].patterns.push(pattern.to_string());
        self.slots[slot].recompile()?;
        debug!(pattern, slot, "Added highlight pattern");
        Ok(())
    }

    /// Stop highlighting `pattern`; returns whether it was present
    pub fn remove_pattern(&mut self, pattern: &str) -> Result<bool> {
        for slot in &mut self.slots {
            if let Some(pos) = slot.patterns.iter().position(|p| p == pattern) {
                slot.patterns.remove(pos);
                slot.recompile()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.slot_of(pattern).is_some()
    }

    /// Slot that holds `pattern`
    pub fn slot_of(&self, pattern: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.patterns.iter().any(|p| p == pattern))
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.patterns.clear();
            slot.regex = None;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.patterns.is_empty())
    }

    /// Patterns of `slot`, in insertion order
    pub fn patterns(&self, slot: usize) -> &[String] {
        self.slots
            .get(slot)
            .map(|s| s.patterns.as_slice())
            .unwrap_or_default()
    }

    /// Every pattern with its slot
    pub fn all_patterns(&self) -> Vec<(usize, &str)> {
        self.slots
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.patterns.iter().map(move |p| (i, p.as_str())))
            .collect()
    }

    /// Non-overlapping `HighlightN` tokens for `line`; lower slots win
    pub fn colorize(&self, line: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(regex) = &slot.regex else {
                continue;
            };
            let scope = ColorScheme::highlight_scope(i);
            for m in regex.find_iter(line).filter(|m| !m.is_empty()) {
                add_lower_token(&mut tokens, &Token::new(Range::new(m.start(), m.end()), scope.clone()));
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(start: usize, end: usize, scope: &str) -> Token {
        Token::new(Range::new(start, end), scope)
    }

    #[test]
    fn test_add_and_colorize() {
        let mut hl = Highlights::new();
        hl.add_pattern("a.b", 0).unwrap();
        hl.add_pattern("zz", 0).unwrap();
        // literals: the dot is not a wildcard
        assert_eq!(hl.colorize("axb a.b zz"), vec![tok(4, 7, "Highlight1"), tok(8, 10, "Highlight1")]);
        assert_eq!(hl.patterns(0), &["a.b".to_string(), "zz".to_string()]);
    }

    #[test]
    fn test_lower_slot_wins() {
        let mut hl = Highlights::new();
        hl.add_pattern("error", 2).unwrap();
        hl.add_pattern("or", 0).unwrap();
        assert_eq!(
            hl.colorize("an error"),
            vec![tok(3, 6, "Highlight3"), tok(6, 8, "Highlight1")]
        );
    }

    #[test]
    fn test_move_between_slots() {
        let mut hl = Highlights::new();
        hl.add_pattern("x", 1).unwrap();
        hl.add_pattern("x", 3).unwrap();
        assert_eq!(hl.slot_of("x"), Some(3));
        assert!(hl.patterns(1).is_empty());
        assert_eq!(hl.all_patterns(), vec![(3, "x")]);
        assert_eq!(hl.colorize("x"), vec![tok(0, 1, "Highlight4")]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut hl = Highlights::new();
        assert!(hl.is_empty());
        hl.add_pattern("a", 0).unwrap();
        hl.add_pattern("b", 1).unwrap();
        assert!(hl.remove_pattern("a").unwrap());
        assert!(!hl.remove_pattern("a").unwrap());
        assert!(!hl.has_pattern("a"));
        assert!(hl.colorize("a").is_empty());
        hl.clear();
        assert!(hl.is_empty());
        assert!(hl.colorize("b").is_empty());
    }

    #[test]
    fn test_empty_pattern_ignored() {
        let mut hl = Highlights::new();
        hl.add_pattern("", 0).unwrap();
        assert!(hl.is_empty());
    }

    #[test]
    fn test_bad_slot() {
        let mut hl = Highlights::new();
        let err = hl.add_pattern("x", HIGHLIGHT_COUNT).unwrap_err();
        assert!(matches!(err, Error::HighlightSlot(4)));
        assert!(err.to_string().contains("out of range"));
        assert!(hl.is_empty());
    }
}
