//! Syntax definitions
//!
//! A [`Syntax`] is an ordered list of rules applied one after another to
//! a line. Rules are validated as they are added: a rule may only read
//! from or colorize groups that earlier rules (or itself) can produce.

use std::collections::BTreeSet;

use tracing::debug;

use super::range::Range;
use super::rules::{GroupName, ParsingState, SearchMode, SyntaxRule};
use super::token::{sort_tokens, Token};
use crate::colorizer::merge_syntax_tokens;
use crate::config_node::ConfigNode;
use crate::error::{ConfigError, Location};

/// Sample line with the colorized substrings it must produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTest {
    pub location: Location,
    pub line: String,
    /// `(substring, scope)` pairs of the flattened token list
    pub expected: Vec<(String, String)>,
}

impl SyntaxTest {
    fn from_node(line: String, node: &ConfigNode) -> Result<Self, ConfigError> {
        let mut expected = Vec::new();
        for pair in node.elements()? {
            if pair.num_elements()? != 2 {
                return Err(pair.error("must be a [substring, scope] pair"));
            }
            expected.push((pair.element(0)?.as_string()?, pair.element(1)?.as_string()?));
        }
        Ok(Self {
            location: node.location(),
            line,
            expected,
        })
    }
}

/// A complete syntax: name, rules and optional self-tests
#[derive(Debug, Clone)]
pub struct Syntax {
    name: String,
    rules: Vec<SyntaxRule>,
    /// Groups bound by the rules added so far (always contains LINE)
    known_groups: BTreeSet<GroupName>,
    used_scopes: BTreeSet<String>,
    tests: Vec<SyntaxTest>,
}

impl Default for Syntax {
    fn default() -> Self {
        Self::new("")
    }
}

impl Syntax {
    /// Create a new empty syntax
    pub fn new(name: &str) -> Self {
        let mut known_groups = BTreeSet::new();
        known_groups.insert(GroupName::Line);
        Self {
            name: name.to_string(),
            rules: Vec::new(),
            known_groups,
            used_scopes: BTreeSet::new(),
            tests: Vec::new(),
        }
    }

    /// Load a syntax from its `{rules, tests}` document node
    pub fn from_node(name: &str, node: &ConfigNode) -> Result<Self, ConfigError> {
        debug!(syntax = name, "Loading syntax");
        node.assert_properties(&["rules", "tests"])?;

        let mut syntax = Self::new(name);
        for rule_node in node.required_member("rules")?.elements()? {
            syntax.add_rule(SyntaxRule::from_node(&rule_node)?)?;
        }

        if node.has_member("tests") {
            for (line, expected) in node.member("tests").members()? {
                syntax.tests.push(SyntaxTest::from_node(line, &expected)?);
            }
        }

        debug!(syntax = name, rules = syntax.rules.len(), "Loaded rules");
        Ok(syntax)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[SyntaxRule] {
        &self.rules
    }

    pub fn tests(&self) -> &[SyntaxTest] {
        &self.tests
    }

    /// Distinct scopes assigned by any rule
    pub fn used_scopes(&self) -> &BTreeSet<String> {
        &self.used_scopes
    }

    /// Append a rule after validating its group references
    pub fn add_rule(&mut self, rule: SyntaxRule) -> Result<&mut Self, ConfigError> {
        let error = |message: String| {
            ConfigError::new(rule.location().clone(), format!("Rule of syntax {}: {}", self.name, message))
        };

        if !self.known_groups.contains(rule.match_group()) {
            return Err(error(format!(
                "matches group {} which is not provided by previous rules",
                rule.match_group()
            )));
        }

        let mut known = self.known_groups.clone();
        known.extend(rule.captures().iter().map(|c| GroupName::source(c)));

        for (group, _) in rule.colorize() {
            let valid = match (rule.mode(), group) {
                (SearchMode::FirstMatch, GroupName::Group) => true,
                (SearchMode::FirstMatch, GroupName::Match) => false,
                (SearchMode::FirstMatch, other) => known.contains(other),
                (SearchMode::AllMatches, GroupName::Match) => true,
                (SearchMode::AllMatches, GroupName::Named(name)) => rule.captures().contains(name),
                (SearchMode::AllMatches, _) => false,
            };
            if !valid {
                return Err(error(format!(
                    "colorizes group {} that is not provided by this or previous rules",
                    group
                )));
            }
        }

        self.known_groups = known;
        self.used_scopes.extend(
            rule.colorize()
                .iter()
                .filter(|(_, scope)| !scope.is_empty())
                .map(|(_, scope)| scope.clone()),
        );
        self.rules.push(rule);
        Ok(self)
    }

    /// Decompose `line` into tokens
    ///
    /// Tokens are sorted by ascending start, and by descending end on
    /// equal starts. Groups no rule colorized have an empty scope.
    pub fn parse(&self, line: &str) -> Vec<Token> {
        let mut state = ParsingState::new(line);
        for rule in &self.rules {
            rule.apply(line, &mut state);
        }
        let ParsingState { groups, mut tokens } = state;
        tokens.extend(groups.into_values());
        sort_tokens(&mut tokens);
        tokens
    }

    /// Parse and flatten `line` into non-overlapping colored tokens
    ///
    /// Captured groups nobody colorized keep their group name as scope
    /// and take part like any other token.
    pub fn flatten(&self, line: &str) -> Vec<Token> {
        let mut flat = Vec::new();
        merge_syntax_tokens(&mut flat, &self.parse(line));
        flat
    }

    /// Like [`flatten`](Self::flatten), keeping only scopes the rules assign
    ///
    /// Placeholder group scopes are dropped before merging, so the
    /// enclosing colorized token shows through them.
    pub fn flatten_assigned(&self, line: &str) -> Vec<Token> {
        let mut tokens = self.parse(line);
        tokens.retain(|t| self.used_scopes.contains(&t.scope));
        let mut flat = Vec::new();
        merge_syntax_tokens(&mut flat, &tokens);
        flat
    }

    /// Check every embedded test against [`flatten_assigned`](Self::flatten_assigned)
    pub fn run_tests(&self) -> Result<(), ConfigError> {
        for test in &self.tests {
            let actual: Vec<(String, String)> = self
                .flatten_assigned(&test.line)
                .into_iter()
                .map(|t| (t.text(&test.line).to_string(), t.scope))
                .collect();
            if actual != test.expected {
                return Err(ConfigError::new(
                    test.location.clone(),
                    format!(
                        "syntax {} test failed for {:?}: expected {:?}, got {:?}",
                        self.name, test.line, test.expected, actual
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Range of the whole line as a token list with one uncolored entry
    pub fn trivial(line: &str) -> Vec<Token> {
        vec![Token::uncolored(Range::whole(line.len()))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_node::ConfigDocument;

    fn first(group: &str, pattern: &str, colorize: &[(&str, &str)]) -> SyntaxRule {
        SyntaxRule::new(group, pattern, SearchMode::FirstMatch, colorize).unwrap()
    }

    fn pairs(line: &str, tokens: &[Token]) -> Vec<(String, String)> {
        tokens
            .iter()
            .map(|t| (t.text(line).to_string(), t.scope.clone()))
            .collect()
    }

    fn owned(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn test_empty_line() {
        let syntax = Syntax::new("empty");
        let tokens = syntax.parse("");
        assert_eq!(tokens, Syntax::trivial(""));
        assert!(syntax.flatten("").is_empty());
    }

    #[test]
    fn test_whole_line() {
        let mut syntax = Syntax::new("whole");
        syntax.add_rule(first("LINE", ".*", &[("LINE", "BASE")])).unwrap();
        let line = "some string";
        assert_eq!(pairs(line, &syntax.parse(line)), owned(&[("some string", "BASE")]));
        assert_eq!(pairs(line, &syntax.flatten(line)), owned(&[("some string", "BASE")]));
    }

    #[test]
    fn test_one_rule() {
        let mut syntax = Syntax::new("one");
        syntax
            .add_rule(first("LINE", r"(?<num>\d+)", &[("LINE", "BASE"), ("num", "NUM")]))
            .unwrap();
        let line = "prefix1234suffix";
        assert_eq!(
            syntax.parse(line),
            vec![
                Token::new(Range::new(0, 16), "BASE"),
                Token::new(Range::new(6, 10), "NUM"),
            ]
        );
        assert_eq!(
            pairs(line, &syntax.flatten(line)),
            owned(&[("prefix", "BASE"), ("1234", "NUM"), ("suffix", "BASE")])
        );
    }

    #[test]
    fn test_nested() {
        let mut syntax = Syntax::new("nested");
        syntax
            .add_rule(first("LINE", r"(?<num>\d+) (?<rest>.*)", &[("num", "NUM")]))
            .unwrap()
            .add_rule(first("rest", r"\[(?<cat>.*)\]", &[("LINE", "BASE"), ("cat", "CAT")]))
            .unwrap();
        let line = "1234 [category] suffix";

        assert_eq!(
            pairs(line, &syntax.parse(line)),
            owned(&[
                ("1234 [category] suffix", "BASE"),
                ("1234", "NUM"),
                ("[category] suffix", "rest"),
                ("category", "CAT"),
            ])
        );
        assert_eq!(
            pairs(line, &syntax.flatten(line)),
            owned(&[
                ("1234", "NUM"),
                (" ", "BASE"),
                ("[", "rest"),
                ("category", "CAT"),
                ("] suffix", "rest"),
            ])
        );
        assert_eq!(
            pairs(line, &syntax.flatten_assigned(line)),
            owned(&[("1234", "NUM"), (" [", "BASE"), ("category", "CAT"), ("] suffix", "BASE")])
        );
    }

    #[test]
    fn test_uncolorized_capture_keeps_group_scope() {
        let mut syntax = Syntax::new("num");
        syntax.add_rule(first("LINE", r"(?<Number>\d+)", &[])).unwrap();
        let line = "ab12";
        assert_eq!(
            syntax.parse(line),
            vec![Token::uncolored(Range::new(0, 4)), Token::new(Range::new(2, 4), "Number")]
        );
        assert_eq!(pairs(line, &syntax.flatten(line)), owned(&[("12", "Number")]));
        assert!(syntax.flatten_assigned(line).is_empty());
    }

    #[test]
    fn test_capture_only_all_matches() {
        let mut syntax = Syntax::new("nums");
        syntax
            .add_rule(SyntaxRule::new("LINE", r"(?<n>\d+)", SearchMode::AllMatches, &[]).unwrap())
            .unwrap();
        let line = "a 1 b 22";
        assert_eq!(
            syntax.parse(line),
            vec![
                Token::uncolored(Range::new(0, 8)),
                Token::new(Range::new(2, 3), "n"),
                Token::new(Range::new(6, 8), "n"),
            ]
        );
    }

    #[test]
    fn test_all_matches_combined_with_groups() {
        let mut syntax = Syntax::new("numbers");
        syntax
            .add_rule(first("LINE", r"^(?<head>\w+):", &[("head", "Head")]))
            .unwrap()
            .add_rule(SyntaxRule::new("LINE", r"\d+", SearchMode::AllMatches, &[("MATCH", "Number")]).unwrap())
            .unwrap();
        let line = "id: 10 and 20";
        assert_eq!(
            pairs(line, &syntax.flatten(line)),
            owned(&[("id", "Head"), ("10", "Number"), ("20", "Number")])
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let mut syntax = Syntax::new("det");
        syntax
            .add_rule(first("LINE", r"(?<a>\w+) (?<b>\w+)", &[("a", "A"), ("b", "B")]))
            .unwrap()
            .add_rule(SyntaxRule::new("b", r"o", SearchMode::AllMatches, &[("MATCH", "O")]).unwrap())
            .unwrap();
        let line = "hello world";
        let once = syntax.parse(line);
        for _ in 0..10 {
            assert_eq!(syntax.parse(line), once);
        }
    }

    #[test]
    fn test_unknown_source_group_rejected() {
        let mut syntax = Syntax::new("bad");
        let err = syntax.add_rule(first("rest", "x", &[])).unwrap_err();
        assert!(err.message.contains("not provided by previous rules"));
    }

    #[test]
    fn test_unknown_colorize_group_rejected() {
        let mut syntax = Syntax::new("bad");
        let err = syntax
            .add_rule(first("LINE", r"(?<a>x)", &[("b", "B")]))
            .unwrap_err();
        assert!(err.message.contains("colorizes group b"));
        assert!(syntax.rules().is_empty());
    }

    #[test]
    fn test_later_rule_may_colorize_earlier_group() {
        let mut syntax = Syntax::new("ok");
        syntax.add_rule(first("LINE", r"(?<a>x)", &[])).unwrap();
        syntax.add_rule(first("a", r"x", &[("a", "A"), ("GROUP", "G")])).unwrap();
        let expected: BTreeSet<String> = ["A", "G"].iter().map(|s| s.to_string()).collect();
        assert_eq!(syntax.used_scopes(), &expected);
    }

    const DOC: &str = r#"
kv:
  rules:
    - match: '^(?<key>\w+)=(?<value>.*)$'
      colorize:
        key: Key
    - group: value
      matchAll: '\d+'
      colorize: Number
  tests:
    "name=abc 12":
      - [name, Key]
      - ["12", Number]
"#;

    #[test]
    fn test_from_node_and_run_tests() {
        let doc = ConfigDocument::parse("kv.syntax.yaml", DOC).unwrap();
        let node = doc.root().member("kv");
        let syntax = Syntax::from_node("kv", &node).unwrap();
        assert_eq!(syntax.name(), "kv");
        assert_eq!(syntax.rules().len(), 2);
        assert_eq!(syntax.tests().len(), 1);
        syntax.run_tests().unwrap();
    }

    #[test]
    fn test_failing_test_is_config_error() {
        let doc = ConfigDocument::parse("kv.syntax.yaml", &DOC.replace("[name, Key]", "[name, Value]")).unwrap();
        let syntax = Syntax::from_node("kv", &doc.root().member("kv")).unwrap();
        let err = syntax.run_tests().unwrap_err();
        assert!(err.message.contains("test failed"));
        assert_eq!(err.location.path, "/kv/tests/name=abc 12");
    }

    #[test]
    fn test_from_node_reports_rule_location() {
        let doc = ConfigDocument::parse(
            "bad.syntax.yaml",
            "bad:\n  rules:\n    - match: x\n    - group: nope\n      match: y\n",
        )
        .unwrap();
        let err = Syntax::from_node("bad", &doc.root().member("bad")).unwrap_err();
        assert_eq!(err.location.to_string(), "bad.syntax.yaml:/bad/rules[1]");
    }
}
