//! Ordered collections of syntaxes
//!
//! The first syntax that recognizes a line (produces more than the
//! trivial whole-line token) owns it. Collections from several
//! configuration layers are merged with last-loaded-wins semantics.

use tracing::{debug, warn};

use super::definition::Syntax;
use super::token::Token;
use crate::config_node::ConfigNode;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct SyntaxCollection {
    syntaxes: Vec<Syntax>,
}

impl SyntaxCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `name: {rules, tests}` entry of a document
    pub fn from_node(node: &ConfigNode) -> Result<Self, ConfigError> {
        let mut collection = Self::new();
        if node.is_null() {
            return Ok(collection);
        }
        for (name, syntax_node) in node.members()? {
            collection.add_syntax(Syntax::from_node(&name, &syntax_node)?);
        }
        Ok(collection)
    }

    /// Append a syntax, replacing any earlier one with the same name
    pub fn add_syntax(&mut self, syntax: Syntax) {
        if let Some(pos) = self.syntaxes.iter().position(|s| s.name() == syntax.name()) {
            warn!(syntax = syntax.name(), "Syntax overridden by a later definition");
            self.syntaxes.remove(pos);
        }
        self.syntaxes.push(syntax);
    }

    /// Merge another layer into this one
    pub fn merge(&mut self, other: SyntaxCollection) {
        for syntax in other.syntaxes {
            self.add_syntax(syntax);
        }
        debug!(count = self.syntaxes.len(), "Merged syntaxes");
    }

    pub fn syntaxes(&self) -> &[Syntax] {
        &self.syntaxes
    }

    pub fn get(&self, name: &str) -> Option<&Syntax> {
        self.syntaxes.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.syntaxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syntaxes.is_empty()
    }

    /// Tokens of the first syntax that recognizes `line`
    ///
    /// When no syntax does, the trivial result of the last one tried is
    /// returned (empty if the collection is empty).
    pub fn parse(&self, line: &str) -> Vec<Token> {
        self.parse_with_owner(line).1
    }

    /// Like [`parse`](Self::parse), also naming the syntax that won
    pub fn parse_with_owner(&self, line: &str) -> (Option<&Syntax>, Vec<Token>) {
        let mut result = Vec::new();
        for syntax in &self.syntaxes {
            result = syntax.parse(line);
            if result.len() > 1 {
                return (Some(syntax), result);
            }
        }
        (None, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_node::ConfigDocument;
    use crate::syntax::{Range, SearchMode, SyntaxRule};

    fn syntax(name: &str, pattern: &str, scope: &str) -> Syntax {
        let mut s = Syntax::new(name);
        s.add_rule(SyntaxRule::new("LINE", pattern, SearchMode::FirstMatch, &[("GROUP", scope)]).unwrap())
            .unwrap();
        s
    }

    #[test]
    fn test_first_recognizing_syntax_wins() {
        let mut coll = SyntaxCollection::new();
        coll.add_syntax(syntax("digits", r"^\d+$", "Number"));
        coll.add_syntax(syntax("whole", r"^\w+", "Word"));
        let mut words = Syntax::new("words2");
        words
            .add_rule(SyntaxRule::new("LINE", r"^(?<w>\w+)", SearchMode::FirstMatch, &[("w", "Word")]).unwrap())
            .unwrap();
        coll.add_syntax(words);

        // "digits" misses and "whole" only recolors LINE: a single token each
        let (owner, tokens) = coll.parse_with_owner("hello there");
        assert_eq!(owner.map(|s| s.name()), Some("words2"));
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::new(Range::new(0, 5), "Word"));
    }

    #[test]
    fn test_no_owner_returns_trivial() {
        let mut coll = SyntaxCollection::new();
        coll.add_syntax(syntax("digits", r"^\d+$", "Number"));
        let (owner, tokens) = coll.parse_with_owner("abc");
        assert!(owner.is_none());
        assert_eq!(tokens, vec![Token::uncolored(Range::new(0, 3))]);
        assert!(SyntaxCollection::new().parse("abc").is_empty());
    }

    #[test]
    fn test_capture_only_all_matches_owns_line() {
        let doc = ConfigDocument::parse(
            "numbers.syntax.yaml",
            "numbers:\n  rules:\n    - matchAll: '(?<n>\\d+)'\n",
        )
        .unwrap();
        let coll = SyntaxCollection::from_node(&doc.root()).unwrap();
        let (owner, tokens) = coll.parse_with_owner("a 1 b 22");
        assert_eq!(owner.map(|s| s.name()), Some("numbers"));
        assert_eq!(
            tokens,
            vec![
                Token::uncolored(Range::new(0, 8)),
                Token::new(Range::new(2, 3), "n"),
                Token::new(Range::new(6, 8), "n"),
            ]
        );
    }

    #[test]
    fn test_merge_last_wins() {
        let mut base = SyntaxCollection::new();
        base.add_syntax(syntax("a", "x", "X"));
        base.add_syntax(syntax("b", "y", "Y"));
        let mut user = SyntaxCollection::new();
        user.add_syntax(syntax("a", "z", "Z"));
        base.merge(user);

        let names: Vec<&str> = base.syntaxes().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(base.get("a").unwrap().rules()[0].pattern(), "z");
    }

    #[test]
    fn test_from_node_keeps_document_order() {
        let doc = ConfigDocument::parse(
            "two.syntax.yaml",
            "zeta:\n  rules:\n    - match: z\nalpha:\n  rules:\n    - match: a\n",
        )
        .unwrap();
        let coll = SyntaxCollection::from_node(&doc.root()).unwrap();
        let names: Vec<&str> = coll.syntaxes().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_from_empty_document() {
        let doc = ConfigDocument::parse("empty.syntax.yaml", "").unwrap();
        assert!(SyntaxCollection::from_node(&doc.root()).unwrap().is_empty());
    }
}
