//! Settings file support
//!
//! Loads settings from `<config dir>/loglight/settings.toml`
//! (`~/.config/loglight/settings.toml` on Linux).
//!
//! Example:
//! ```toml
//! color-scheme = "dark"
//! config-dirs = ["/opt/team/loglight"]
//! run-tests = true
//! ```
//!
//! Missing keys take their default value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::struct_config::LoadOptions;

/// Directory name used under the platform config directory
pub const APP_DIR: &str = "loglight";

/// Extra configuration directory, scanned after every other one
pub const CONFIG_DIR_ENV: &str = "LOGLIGHT_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Name of the active color scheme; "default" is the built-in one
    pub color_scheme: String,
    /// Additional directories with `*.syntax.yaml`/`*.colors.yaml` files
    pub config_dirs: Vec<PathBuf>,
    /// Load the documents compiled into the binary
    pub builtin: bool,
    /// Run the tests embedded in syntax documents while loading
    pub run_tests: bool,
    /// Abort loading on the first configuration error
    pub stop_on_error: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color_scheme: crate::store::DEFAULT_SCHEME.to_string(),
            config_dirs: Vec::new(),
            builtin: true,
            run_tests: false,
            stop_on_error: false,
        }
    }
}

impl Settings {
    /// Load from the default location; defaults if absent or unreadable
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(settings) => settings,
            Err(e) => {
                debug!(error = %e, "Using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let settings: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    fn load_from_default_path() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// `<config dir>/loglight/settings.toml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::user_dir()?.join("settings.toml"))
    }

    /// Per-user configuration directory
    pub fn user_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR))
    }

    /// System-wide configuration directory
    pub fn system_dir() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            Some(PathBuf::from("/etc").join(APP_DIR))
        }

        #[cfg(not(unix))]
        {
            None
        }
    }

    /// Directories to scan, lowest priority first
    ///
    /// System, user, the configured extra directories, then the
    /// directory named by `LOGLIGHT_CONFIG_DIR`.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Self::system_dir().into_iter().collect();
        if let Ok(user) = Self::user_dir() {
            dirs.push(user);
        }
        dirs.extend(self.config_dirs.iter().cloned());
        if let Some(dev) = std::env::var_os(CONFIG_DIR_ENV) {
            dirs.push(PathBuf::from(dev));
        }
        dirs
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            run_tests: self.run_tests,
            stop_on_error: self.stop_on_error,
        }
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.color_scheme, "default");
        assert!(settings.builtin);
        assert!(!settings.run_tests);
        assert!(!settings.stop_on_error);
    }

    #[test]
    fn test_parse_partial() {
        let settings: Settings = toml::from_str("color-scheme = \"dark\"\nrun-tests = true\n").unwrap();
        assert_eq!(settings.color_scheme, "dark");
        assert!(settings.run_tests);
        assert!(settings.builtin);
        assert_eq!(
            settings.load_options(),
            LoadOptions {
                run_tests: true,
                stop_on_error: false
            }
        );
    }

    #[test]
    fn test_unknown_value_type_rejected() {
        assert!(toml::from_str::<Settings>("builtin = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            color_scheme: "light".to_string(),
            config_dirs: vec![PathBuf::from("/tmp/extra")],
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_search_dirs_include_configured() {
        let settings = Settings {
            config_dirs: vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")],
            ..Settings::default()
        };
        let dirs = settings.search_dirs();
        let a = dirs.iter().position(|d| d == Path::new("/srv/a")).unwrap();
        let b = dirs.iter().position(|d| d == Path::new("/srv/b")).unwrap();
        assert!(a < b);
    }
}
