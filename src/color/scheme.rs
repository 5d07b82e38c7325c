//! Color schemes
//!
//! A scheme maps scope names to [`TextColor`] pairs. Schemes are read from
//! documents of the form
//!
//! ```yaml
//! _base:                 # leading underscore: abstract, only inheritable
//!   defs: {accent: '#3070d0'}
//!   user: {Number: accent}
//! dark:
//!   inherits: _base
//!   text: ['#d0d0d0', '#202020']
//!   highlight: [[black, yellow]]
//!   user: {Error: red}
//! ```
//!
//! Resolution walks the `inherits` chain root first: every ancestor's
//! `defs` are applied before any scope assignment, so a descendant can
//! recolor everything its ancestors assigned through an alias.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::style::{Color, TextColor};
use crate::config_node::ConfigNode;
use crate::error::ConfigError;

/// Number of user highlight color slots
pub const HIGHLIGHT_COUNT: usize = 4;

pub const TEXT: &str = "Text";
pub const SELECTION: &str = "Selection";
pub const QUICK_FIND: &str = "QuickFind";

/// Prefix of scheme names that can only be inherited from
pub const ABSTRACT_PREFIX: &str = "_";

const SCHEME_PROPERTIES: &[&str] = &[
    "inherits",
    "defs",
    "text",
    "selection",
    "quickFind",
    "highlight",
    "user",
];

/// Loaded schemes by name
pub type ColorSchemeMap = BTreeMap<String, ColorScheme>;

type Defs = HashMap<String, Color>;

#[derive(Debug, Clone)]
pub struct ColorScheme {
    text: TextColor,
    selection: TextColor,
    quick_find: TextColor,
    highlight: [TextColor; HIGHLIGHT_COUNT],
    user: BTreeMap<String, Color>,
    /// Every known scope resolved to a pair; rebuilt on each change
    colors: HashMap<String, TextColor>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        let black = Color::BLACK;
        let mut scheme = Self {
            text: TextColor::new(black, Color::WHITE),
            selection: TextColor::new(Color::WHITE, Color::rgb(0x30, 0x70, 0xd0)),
            quick_find: TextColor::new(black, Color::rgb(0xff, 0xff, 0x00)),
            highlight: [
                TextColor::new(black, Color::rgb(0xff, 0xff, 0x00)),
                TextColor::new(black, Color::rgb(0x00, 0xff, 0xff)),
                TextColor::new(black, Color::rgb(0xff, 0x80, 0xff)),
                TextColor::new(black, Color::rgb(0x80, 0xff, 0x80)),
            ],
            user: BTreeMap::new(),
            colors: HashMap::new(),
        };
        scheme.regenerate();
        scheme
    }
}

impl PartialEq for ColorScheme {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.selection == other.selection
            && self.quick_find == other.quick_find
            && self.highlight == other.highlight
            && self.user == other.user
    }
}

impl Eq for ColorScheme {}

impl ColorScheme {
    /// Scope name of highlight slot `index` (0-based): `Highlight1`..
    pub fn highlight_scope(index: usize) -> String {
        format!("Highlight{}", index + 1)
    }

    pub fn text(&self) -> TextColor {
        self.text
    }

    pub fn selection(&self) -> TextColor {
        self.selection
    }

    pub fn quick_find(&self) -> TextColor {
        self.quick_find
    }

    pub fn highlight(&self) -> &[TextColor; HIGHLIGHT_COUNT] {
        &self.highlight
    }

    pub fn user(&self) -> &BTreeMap<String, Color> {
        &self.user
    }

    pub fn set_text(&mut self, color: TextColor) {
        self.text = color;
        self.regenerate();
    }

    pub fn set_selection(&mut self, color: TextColor) {
        self.selection = color;
        self.regenerate();
    }

    pub fn set_quick_find(&mut self, color: TextColor) {
        self.quick_find = color;
        self.regenerate();
    }

    /// Set highlight slot `index`; out-of-range indices are ignored
    pub fn set_highlight(&mut self, index: usize, color: TextColor) {
        if let Some(slot) = self.highlight.get_mut(index) {
            *slot = color;
            self.regenerate();
        }
    }

    pub fn set_user_scope(&mut self, scope: &str, color: Color) {
        self.user.insert(scope.to_string(), color);
        self.regenerate();
    }

    /// Colors for `scope`; unknown scopes get the text colors
    pub fn scope_color(&self, scope: &str) -> TextColor {
        self.colors.get(scope).copied().unwrap_or(self.text)
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.colors.contains_key(scope)
    }

    /// Every scope this scheme can color, sorted
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes: Vec<&str> = self.colors.keys().map(String::as_str).collect();
        scopes.sort_unstable();
        scopes
    }

    fn regenerate(&mut self) {
        let mut colors = HashMap::with_capacity(self.user.len() + 3 + HIGHLIGHT_COUNT);
        for (scope, color) in &self.user {
            colors.insert(scope.clone(), TextColor::new(*color, self.text.background));
        }
        // fixed scopes cannot be shadowed by a user scope of the same name
        colors.insert(TEXT.to_string(), self.text);
        colors.insert(SELECTION.to_string(), self.selection);
        colors.insert(QUICK_FIND.to_string(), self.quick_find);
        for (i, color) in self.highlight.iter().enumerate() {
            colors.insert(Self::highlight_scope(i), *color);
        }
        self.colors = colors;
    }

    /// Apply one scheme node's scope assignments on top of this scheme
    fn apply_node(&mut self, node: &ConfigNode, defs: &Defs) -> Result<(), ConfigError> {
        if node.has_member("text") {
            self.text = read_text_color(&node.member("text"), defs)?;
        }
        if node.has_member("selection") {
            self.selection = read_text_color(&node.member("selection"), defs)?;
        }
        if node.has_member("quickFind") {
            self.quick_find = read_text_color(&node.member("quickFind"), defs)?;
        }
        if node.has_member("highlight") {
            let list = node.member("highlight");
            let count = list.num_elements()?;
            if count > HIGHLIGHT_COUNT {
                return Err(list.error(format!(
                    "has {} entries but at most {} are allowed",
                    count, HIGHLIGHT_COUNT
                )));
            }
            for (i, pair) in list.elements()?.iter().enumerate() {
                self.highlight[i] = read_text_color(pair, defs)?;
            }
        }
        if node.has_member("user") {
            for (scope, value) in node.member("user").members()? {
                let color = read_color(&value, Some(defs), Some(&self.user))?;
                self.user.insert(scope, color);
            }
        }
        self.regenerate();
        Ok(())
    }
}

/// Read a color from a literal, a def alias or another user scope
///
/// Each alias kind is only consulted when its table is given.
pub fn read_color(
    node: &ConfigNode,
    defs: Option<&Defs>,
    user: Option<&BTreeMap<String, Color>>,
) -> Result<Color, ConfigError> {
    if node.is_type::<u32>() {
        let value: u32 = node.as_type()?;
        return Color::from_u32(value)
            .ok_or_else(|| node.error(format!("has value {:#x} which is not a 24-bit color", value)));
    }
    let text = node.as_string()?;
    if let Some(color) = Color::parse(&text) {
        return Ok(color);
    }
    if let Some(color) = defs.and_then(|d| d.get(&text)) {
        return Ok(*color);
    }
    if let Some(color) = user.and_then(|u| u.get(&text)) {
        return Ok(*color);
    }
    let mut accepted = vec!["a color literal (#RRGGBB)"];
    if defs.is_some() {
        accepted.push("a defs alias");
    }
    if user.is_some() {
        accepted.push("a user scope");
    }
    Err(node.error(format!(
        "has value '{}' which is not {}",
        text,
        accepted.join(" or ")
    )))
}

/// Read a `[foreground, background]` pair
fn read_text_color(node: &ConfigNode, defs: &Defs) -> Result<TextColor, ConfigError> {
    if node.num_elements()? != 2 {
        return Err(node.error("must be a [foreground, background] pair"));
    }
    Ok(TextColor::new(
        read_color(&node.element(0)?, Some(defs), None)?,
        read_color(&node.element(1)?, Some(defs), None)?,
    ))
}

pub fn is_abstract(name: &str) -> bool {
    name.starts_with(ABSTRACT_PREFIX)
}

/// Scheme definitions pooled from one or more documents
///
/// A later definition of a name replaces an earlier one. Inheritance is
/// resolved only when a scheme is requested, so a scheme may inherit
/// from one defined in any pooled document.
#[derive(Debug, Clone, Default)]
pub struct SchemeDefinitions<'a> {
    entries: Vec<(String, ConfigNode<'a>)>,
}

impl<'a> SchemeDefinitions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool every top-level entry of a colors document
    pub fn add_document(&mut self, root: &ConfigNode<'a>) -> Result<(), ConfigError> {
        if root.is_null() {
            return Ok(());
        }
        for (name, node) in root.members()? {
            if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
                warn!(scheme = %name, location = %node.location(), "Color scheme overridden by a later definition");
                entry.1 = node;
            } else {
                self.entries.push((name, node));
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&ConfigNode<'a>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    /// Names of selectable (non-abstract) schemes, in definition order
    pub fn concrete_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| !is_abstract(n))
            .collect()
    }

    /// Definition node of `name` and of each ancestor, root first
    fn chain(&self, name: &str) -> Result<Vec<&ConfigNode<'a>>, ConfigError> {
        let mut node = self.get(name).ok_or_else(|| {
            ConfigError::new(Default::default(), format!("color scheme {} is not defined", name))
        })?;
        let mut visited = vec![name.to_string()];
        let mut chain = Vec::new();
        loop {
            node.assert_properties(SCHEME_PROPERTIES)?;
            chain.push(node);
            if !node.has_member("inherits") {
                break;
            }
            let inherits = node.member("inherits");
            let parent = inherits.as_string()?;
            if visited.contains(&parent) {
                visited.push(parent);
                return Err(inherits.error(format!(
                    "inheritance cycle: {}",
                    visited.join(" -> ")
                )));
            }
            node = self.get(&parent).ok_or_else(|| {
                inherits.error(format!("inherits unknown color scheme {}", parent))
            })?;
            visited.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Resolve scheme `name` through its inheritance chain
    pub fn resolve(&self, name: &str) -> Result<ColorScheme, ConfigError> {
        let chain = self.chain(name)?;

        let mut defs = Defs::new();
        for node in &chain {
            if node.has_member("defs") {
                for (alias, value) in node.member("defs").members()? {
                    let color = read_color(&value, Some(&defs), None)?;
                    defs.insert(alias, color);
                }
            }
        }

        let mut scheme = ColorScheme::default();
        for node in &chain {
            scheme.apply_node(node, &defs)?;
        }
        debug!(scheme = name, depth = chain.len(), scopes = scheme.colors.len(), "Resolved color scheme");
        Ok(scheme)
    }

    /// Resolve every concrete scheme; the first error aborts
    pub fn resolve_all(&self) -> Result<ColorSchemeMap, ConfigError> {
        self.concrete_names()
            .into_iter()
            .map(|name| -> Result<_, ConfigError> { Ok((name.to_string(), self.resolve(name)?)) })
            .collect()
    }
}

/// Load every concrete scheme of a single document
pub fn load_all(node: &ConfigNode) -> Result<ColorSchemeMap, ConfigError> {
    let mut definitions = SchemeDefinitions::new();
    definitions.add_document(node)?;
    definitions.resolve_all()
}
