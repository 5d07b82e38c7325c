//! Quick find: an incremental, transient search pattern

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::color::QUICK_FIND;
use crate::syntax::{Range, Token};

#[derive(Debug, Clone, Default)]
pub struct QuickFindPattern {
    pattern: String,
    ignore_case: bool,
    regex: Option<Regex>,
}

impl QuickFindPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pattern
    ///
    /// An empty or invalid pattern leaves quick find inactive.
    pub fn set_pattern(&mut self, pattern: &str, ignore_case: bool) {
        self.pattern = pattern.to_string();
        self.ignore_case = ignore_case;
        self.regex = if pattern.is_empty() {
            None
        } else {
            match RegexBuilder::new(pattern).case_insensitive(ignore_case).build() {
                Ok(regex) => {
                    debug!(pattern, ignore_case, "Quick find pattern set");
                    Some(regex)
                }
                Err(e) => {
                    warn!(pattern, error = %e, "Invalid quick find pattern");
                    None
                }
            }
        };
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// All non-empty, non-overlapping matches in `line`
    pub fn match_line(&self, line: &str) -> Vec<Range> {
        match &self.regex {
            Some(regex) => regex
                .find_iter(line)
                .filter(|m| !m.is_empty())
                .map(|m| Range::new(m.start(), m.end()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// First match starting at or after byte `column`
    pub fn find_forward(&self, line: &str, column: usize) -> Option<Range> {
        self.match_line(line).into_iter().find(|r| r.start >= column)
    }

    /// Last match starting before byte `column`
    pub fn find_backward(&self, line: &str, column: usize) -> Option<Range> {
        self.match_line(line).into_iter().rev().find(|r| r.start < column)
    }

    /// Matches as `QuickFind` tokens
    pub fn tokens(&self, line: &str) -> Vec<Token> {
        self.match_line(line)
            .into_iter()
            .map(|r| Token::new(r, QUICK_FIND))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_by_default() {
        let qf = QuickFindPattern::new();
        assert!(!qf.is_active());
        assert!(qf.match_line("anything").is_empty());
    }

    #[test]
    fn test_match_line() {
        let mut qf = QuickFindPattern::new();
        qf.set_pattern(r"\d+", false);
        assert_eq!(qf.match_line("a1 b22 c"), vec![Range::new(1, 2), Range::new(4, 6)]);
        assert_eq!(qf.tokens("a1")[0], Token::new(Range::new(1, 2), "QuickFind"));
    }

    #[test]
    fn test_ignore_case() {
        let mut qf = QuickFindPattern::new();
        qf.set_pattern("error", true);
        assert_eq!(qf.match_line("ERROR Error"), vec![Range::new(0, 5), Range::new(6, 11)]);
        qf.set_pattern("error", false);
        assert!(qf.match_line("ERROR Error").is_empty());
    }

    #[test]
    fn test_find_forward_backward() {
        let mut qf = QuickFindPattern::new();
        qf.set_pattern("ab", false);
        let line = "ab ab ab";
        assert_eq!(qf.find_forward(line, 1), Some(Range::new(3, 5)));
        assert_eq!(qf.find_forward(line, 7), None);
        assert_eq!(qf.find_backward(line, 6), Some(Range::new(3, 5)));
        assert_eq!(qf.find_backward(line, 0), None);
    }

    #[test]
    fn test_invalid_pattern_is_inactive() {
        let mut qf = QuickFindPattern::new();
        qf.set_pattern("(unclosed", false);
        assert!(!qf.is_active());
        assert_eq!(qf.pattern(), "(unclosed");
        qf.set_pattern("", false);
        assert!(!qf.is_active());
    }

    #[test]
    fn test_empty_matches_skipped() {
        let mut qf = QuickFindPattern::new();
        qf.set_pattern("x*", false);
        assert_eq!(qf.match_line("axxb"), vec![Range::new(1, 3)]);
    }
}
