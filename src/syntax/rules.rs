//! Pattern rules for line decomposition
//!
//! A rule matches its regex against the text of a group bound by an
//! earlier rule (initially the whole line), binds the named captures it
//! finds and assigns scopes to groups. Chaining rules this way lets a
//! later rule see only the part of the line an earlier one isolated.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use regex::Regex;
use tracing::trace;

use super::range::Range;
use super::token::Token;
use crate::config_node::ConfigNode;
use crate::error::{ConfigError, Location};

/// Whole line; the only group bound before any rule runs
pub const GROUP_LINE: &str = "LINE";
/// Whole match of an `matchAll` rule
pub const GROUP_MATCH: &str = "MATCH";
/// The group a `match` rule was applied to
pub const GROUP_GROUP: &str = "GROUP";

/// Name of a group a rule reads from or colorizes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupName {
    Line,
    Match,
    Group,
    Named(String),
}

impl GroupName {
    /// Group as referenced by `group:` or by a capture of a `match` rule
    pub fn source(name: &str) -> Self {
        if name == GROUP_LINE {
            GroupName::Line
        } else {
            GroupName::Named(name.to_string())
        }
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupName::Line => f.write_str(GROUP_LINE),
            GroupName::Match => f.write_str(GROUP_MATCH),
            GroupName::Group => f.write_str(GROUP_GROUP),
            GroupName::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Bind the captures of the first match
    FirstMatch,
    /// Emit tokens for every non-overlapping match
    AllMatches,
}

impl SearchMode {
    /// Document key selecting this mode
    pub fn key(&self) -> &'static str {
        match self {
            SearchMode::FirstMatch => "match",
            SearchMode::AllMatches => "matchAll",
        }
    }

    /// Sentinel a `colorize` shorthand string applies to
    fn context_group(&self) -> &'static str {
        match self {
            SearchMode::FirstMatch => GROUP_GROUP,
            SearchMode::AllMatches => GROUP_MATCH,
        }
    }

    /// Capture group name the pattern may not define
    fn forbidden_capture(&self) -> &'static str {
        match self {
            SearchMode::FirstMatch => GROUP_MATCH,
            SearchMode::AllMatches => GROUP_GROUP,
        }
    }
}

/// Per-line state threaded through the rules of a syntax
#[derive(Debug, Clone, Default)]
pub struct ParsingState {
    /// Last token bound to each group by `match` rules
    pub groups: BTreeMap<GroupName, Token>,
    /// Tokens emitted by `matchAll` rules
    pub tokens: Vec<Token>,
}

impl ParsingState {
    /// Initial state: only `LINE` is bound, uncolored
    pub fn new(line: &str) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(GroupName::Line, Token::uncolored(Range::whole(line.len())));
        Self {
            groups,
            tokens: Vec::new(),
        }
    }
}

/// Escape each literal and join them as a regex alternation
pub fn escaped_alternation<S: AsRef<str>>(literals: &[S]) -> String {
    literals
        .iter()
        .map(|s| regex::escape(s.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

/// A single rule of a [`Syntax`](super::Syntax)
#[derive(Debug, Clone)]
pub struct SyntaxRule {
    location: Location,
    match_group: GroupName,
    pattern: Regex,
    mode: SearchMode,
    /// Named capture groups defined by the pattern
    captures: BTreeSet<String>,
    /// Group to scope assignments, in declaration order
    colorize: Vec<(GroupName, String)>,
}

impl SyntaxRule {
    /// Create a rule programmatically
    pub fn new(
        group: &str,
        pattern: &str,
        mode: SearchMode,
        colorize: &[(&str, &str)],
    ) -> Result<Self, ConfigError> {
        let colorize = colorize
            .iter()
            .map(|(g, s)| (g.to_string(), s.to_string()))
            .collect();
        Self::build(
            Location::default(),
            GroupName::source(group),
            pattern,
            mode,
            colorize,
        )
    }

    /// Load a rule from its document node
    pub fn from_node(node: &ConfigNode) -> Result<Self, ConfigError> {
        node.assert_properties(&["group", "match", "matchAll", "colorize"])?;

        let (mode, pattern_node) = match (node.has_member("match"), node.has_member("matchAll")) {
            (true, false) => (SearchMode::FirstMatch, node.member("match")),
            (false, true) => (SearchMode::AllMatches, node.member("matchAll")),
            _ => return Err(node.error("must have exactly one of 'match' or 'matchAll'")),
        };
        let pattern = if pattern_node.is_array() {
            escaped_alternation(&pattern_node.as_string_list()?)
        } else {
            pattern_node.as_string()?
        };

        let group = node.member_or("group", GROUP_LINE)?.as_string()?;

        let mut colorize = Vec::new();
        if node.has_member("colorize") {
            let colorize_node = node.member("colorize");
            if colorize_node.is_object() {
                for (group, scope) in colorize_node.members()? {
                    colorize.push((group, scope.as_string()?));
                }
            } else {
                colorize.push((mode.context_group().to_string(), colorize_node.as_string()?));
            }
        }

        Self::build(
            node.location(),
            GroupName::source(&group),
            &pattern,
            mode,
            colorize,
        )
    }

    fn build(
        location: Location,
        match_group: GroupName,
        pattern: &str,
        mode: SearchMode,
        colorize: Vec<(String, String)>,
    ) -> Result<Self, ConfigError> {
        let error = |message: String| ConfigError::new(location.clone(), message);

        let regex = Regex::new(pattern).map_err(|e| {
            error(format!("not a valid regular expression: {}: {}", pattern, e))
        })?;
        let captures: BTreeSet<String> = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        let forbidden = mode.forbidden_capture();
        if captures.contains(forbidden) {
            return Err(error(format!(
                "'{}' rule defines a capture group named {}",
                mode.key(),
                forbidden
            )));
        }

        let mut resolved = Vec::with_capacity(colorize.len());
        for (group, scope) in colorize {
            let target = match mode {
                SearchMode::FirstMatch => match group.as_str() {
                    GROUP_GROUP => GroupName::Group,
                    GROUP_MATCH => {
                        return Err(error(format!(
                            "colorizes {} which is only available to 'matchAll' rules",
                            GROUP_MATCH
                        )))
                    }
                    other => GroupName::source(other),
                },
                SearchMode::AllMatches => {
                    if captures.contains(&group) {
                        GroupName::Named(group)
                    } else if group == GROUP_MATCH {
                        GroupName::Match
                    } else {
                        return Err(error(format!(
                            "colorizes group {} which is not defined by the pattern",
                            group
                        )));
                    }
                }
            };
            resolved.push((target, scope));
        }

        Ok(Self {
            location,
            match_group,
            pattern: regex,
            mode,
            captures,
            colorize: resolved,
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn match_group(&self) -> &GroupName {
        &self.match_group
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn captures(&self) -> &BTreeSet<String> {
        &self.captures
    }

    pub fn colorize(&self) -> &[(GroupName, String)] {
        &self.colorize
    }

    /// Apply the rule to `line`, updating `state`
    ///
    /// Does nothing when the source group is not bound: the rule it
    /// depends on did not fire for this line.
    pub fn apply(&self, line: &str, state: &mut ParsingState) {
        let Some(source) = state.groups.get(&self.match_group) else {
            trace!(rule = %self.location, group = %self.match_group, "source group not bound");
            return;
        };
        let range = source.range;
        let text = range.slice(line);
        trace!(rule = %self.location, pattern = self.pattern.as_str(), text, "matching");

        match self.mode {
            SearchMode::FirstMatch => self.apply_first(text, range.start, state),
            SearchMode::AllMatches => self.apply_all(text, range.start, state),
        }
    }

    fn apply_first(&self, text: &str, offset: usize, state: &mut ParsingState) {
        let Some(caps) = self.pattern.captures(text) else {
            return;
        };

        for name in &self.captures {
            if let Some(m) = caps.name(name) {
                if m.is_empty() {
                    continue;
                }
                let range = Range::new(offset + m.start(), offset + m.end());
                trace!(group = name.as_str(), %range, "captured");
                // the group name stands in for the scope until colorized
                state
                    .groups
                    .insert(GroupName::source(name), Token::new(range, name.as_str()));
            }
        }

        for (group, scope) in &self.colorize {
            let target = match group {
                GroupName::Group => &self.match_group,
                other => other,
            };
            if let Some(token) = state.groups.get_mut(target) {
                token.scope = scope.clone();
            }
        }
    }

    fn apply_all(&self, text: &str, offset: usize, state: &mut ParsingState) {
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let mut captured: Vec<(&str, Token)> = Vec::new();
            for name in &self.captures {
                if let Some(m) = caps.name(name).filter(|m| !m.is_empty()) {
                    let range = Range::new(offset + m.start(), offset + m.end());
                    captured.push((name.as_str(), Token::new(range, name.as_str())));
                }
            }
            for (group, scope) in &self.colorize {
                match group {
                    GroupName::Match if !whole.is_empty() => {
                        let range = Range::new(offset + whole.start(), offset + whole.end());
                        state.tokens.push(Token::new(range, scope.clone()));
                    }
                    GroupName::Named(name) => {
                        let target = captured.iter_mut().find(|(n, _)| *n == name.as_str());
                        if let Some((_, token)) = target {
                            token.scope = scope.clone();
                        }
                    }
                    _ => {}
                }
            }
            state.tokens.extend(captured.into_iter().map(|(_, token)| token));
        }
    }
}
