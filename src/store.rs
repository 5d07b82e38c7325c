//! The active configuration
//!
//! Renders take a [`snapshot`](ConfigStore::snapshot) and keep using it;
//! a reload swaps in a whole new [`StructConfig`] without touching
//! snapshots already handed out.

use std::sync::Arc;

use tracing::{info, warn};

use crate::color::ColorScheme;
use crate::error::{Error, Result};
use crate::struct_config::StructConfig;
use crate::syntax::SyntaxCollection;

/// Name of the built-in fallback color scheme
pub const DEFAULT_SCHEME: &str = "default";

/// Message for the user produced by a reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice(pub String);

#[derive(Debug)]
pub struct ConfigStore {
    config: Arc<StructConfig>,
    default_scheme: ColorScheme,
    active: String,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(StructConfig::default())
    }
}

impl ConfigStore {
    pub fn new(config: StructConfig) -> Self {
        Self {
            config: Arc::new(config),
            default_scheme: ColorScheme::default(),
            active: DEFAULT_SCHEME.to_string(),
        }
    }

    /// Replace the configuration
    ///
    /// If the active scheme disappeared, falls back to the default one
    /// and returns a notice saying so.
    pub fn reload(&mut self, config: StructConfig) -> Option<Notice> {
        self.config = Arc::new(config);
        if self.has_scheme(&self.active) {
            info!(scheme = %self.active, "Configuration reloaded");
            return None;
        }
        let message = format!(
            "Color scheme {} is no longer defined; using {}",
            self.active, DEFAULT_SCHEME
        );
        warn!("{}", message);
        self.active = DEFAULT_SCHEME.to_string();
        Some(Notice(message))
    }

    fn has_scheme(&self, name: &str) -> bool {
        name == DEFAULT_SCHEME || self.config.color_scheme(name).is_some()
    }

    pub fn set_color_scheme(&mut self, name: &str) -> Result<()> {
        if !self.has_scheme(name) {
            return Err(Error::UnknownColorScheme(name.to_string()));
        }
        self.active = name.to_string();
        Ok(())
    }

    pub fn color_scheme_name(&self) -> &str {
        &self.active
    }

    /// Selectable scheme names: "default" first, then loaded ones sorted
    pub fn color_scheme_names(&self) -> Vec<String> {
        std::iter::once(DEFAULT_SCHEME.to_string())
            .chain(
                self.config
                    .color_schemes()
                    .keys()
                    .filter(|name| name.as_str() != DEFAULT_SCHEME)
                    .cloned(),
            )
            .collect()
    }

    /// The active scheme
    pub fn color_scheme(&self) -> &ColorScheme {
        if self.active == DEFAULT_SCHEME {
            return &self.default_scheme;
        }
        self.config
            .color_scheme(&self.active)
            .unwrap_or(&self.default_scheme)
    }

    pub fn syntaxes(&self) -> &SyntaxCollection {
        self.config.syntaxes()
    }

    /// Shared handle to the current configuration
    pub fn snapshot(&self) -> Arc<StructConfig> {
        Arc::clone(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::struct_config::{ConfigFiles, DocumentKind, LoadOptions};

    fn config_with(colors: &str) -> StructConfig {
        let mut files = ConfigFiles::new();
        files.add_source("s.colors.yaml", colors, DocumentKind::Colors);
        StructConfig::load(&files, LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_starts_on_default() {
        let store = ConfigStore::default();
        assert_eq!(store.color_scheme_name(), "default");
        assert_eq!(store.color_scheme(), &ColorScheme::default());
        assert_eq!(store.color_scheme_names(), vec!["default".to_string()]);
    }

    #[test]
    fn test_set_scheme() {
        let mut store = ConfigStore::new(config_with("zeta: {}\nalpha:\n  user: {X: red}\n"));
        assert_eq!(store.color_scheme_names(), vec!["default", "alpha", "zeta"]);
        store.set_color_scheme("alpha").unwrap();
        assert!(store.color_scheme().has_scope("X"));
        assert!(matches!(
            store.set_color_scheme("missing"),
            Err(Error::UnknownColorScheme(name)) if name == "missing"
        ));
        assert_eq!(store.color_scheme_name(), "alpha");
    }

    #[test]
    fn test_reload_keeps_scheme() {
        let mut store = ConfigStore::new(config_with("alpha: {}\n"));
        store.set_color_scheme("alpha").unwrap();
        assert_eq!(store.reload(config_with("alpha: {}\nbeta: {}\n")), None);
        assert_eq!(store.color_scheme_name(), "alpha");
    }

    #[test]
    fn test_reload_falls_back() {
        let mut store = ConfigStore::new(config_with("alpha: {}\n"));
        store.set_color_scheme("alpha").unwrap();
        let old = store.snapshot();

        let notice = store.reload(config_with("beta: {}\n")).unwrap();
        assert!(notice.0.contains("alpha"));
        assert_eq!(store.color_scheme_name(), "default");
        // snapshots taken earlier still see the old configuration
        assert!(old.color_scheme("alpha").is_some());
        assert!(store.snapshot().color_scheme("alpha").is_none());
    }
}
