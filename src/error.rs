//! Error types for loglight

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for loglight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Where in a configuration document something was declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// Document the node came from (file path or built-in name)
    pub origin: String,
    /// Path of the node inside the document, e.g. `/generic/rules[2]`
    pub path: String,
}

impl Location {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.origin.is_empty(), self.path.is_empty()) {
            (true, true) => write!(f, "<unknown>"),
            (true, false) => write!(f, "{}", self.path),
            (false, true) => write!(f, "{}", self.origin),
            (false, false) => write!(f, "{}:{}", self.origin, self.path),
        }
    }
}

/// A problem found while loading syntax or color scheme documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error parsing config: {location}: {message}")]
pub struct ConfigError {
    pub location: Location,
    pub message: String,
}

impl ConfigError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// Library error types
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Cannot write settings: {0}")]
    SettingsSave(#[from] toml::ser::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Color scheme {0} not found")]
    UnknownColorScheme(String),

    #[error("No configuration directory on this platform")]
    NoConfigDir,

    #[error("Highlight slot {0} out of range")]
    HighlightSlot(usize),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
