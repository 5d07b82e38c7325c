//! Loading syntaxes and color schemes from configuration layers
//!
//! Sources are read in priority order (built-in, system, user, extra):
//! a later syntax or scheme with the same name replaces an earlier one.
//! A broken file is reported and skipped unless loading is asked to stop
//! on the first error.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::color::{self, ColorScheme, ColorSchemeMap, SchemeDefinitions};
use crate::config::Settings;
use crate::config_node::ConfigDocument;
use crate::error::{Error, Result};
use crate::syntax::{self, SyntaxCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Syntax,
    Colors,
}

impl DocumentKind {
    /// File name suffix of this kind of document
    pub fn suffix(self) -> &'static str {
        match self {
            DocumentKind::Syntax => ".syntax.yaml",
            DocumentKind::Colors => ".colors.yaml",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        [DocumentKind::Syntax, DocumentKind::Colors]
            .into_iter()
            .find(|kind| name.len() > kind.suffix().len() && name.ends_with(kind.suffix()))
    }
}

/// One configuration document, not yet parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub origin: String,
    pub text: String,
    pub kind: DocumentKind,
}

/// Ordered list of configuration documents, lowest priority first
#[derive(Debug, Clone, Default)]
pub struct ConfigFiles {
    sources: Vec<ConfigSource>,
}

impl ConfigFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the documents compiled into the binary
    pub fn builtin() -> Self {
        let mut files = Self::new();
        files.add_builtin();
        files
    }

    /// Built-in documents (if enabled) plus every search directory
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut files = Self::new();
        if settings.builtin {
            files.add_builtin();
        }
        files.scan_dirs(&settings.search_dirs())?;
        Ok(files)
    }

    pub fn add_builtin(&mut self) -> &mut Self {
        self.add_source(syntax::builtin::ORIGIN, syntax::builtin::DOCUMENT, DocumentKind::Syntax);
        self.add_source(color::builtin::ORIGIN, color::builtin::DOCUMENT, DocumentKind::Colors);
        self
    }

    pub fn add_source(&mut self, origin: impl Into<String>, text: impl Into<String>, kind: DocumentKind) -> &mut Self {
        self.sources.push(ConfigSource {
            origin: origin.into(),
            text: text.into(),
            kind,
        });
        self
    }

    /// Add the documents of `dir`, sorted by file name
    ///
    /// A missing directory is skipped. Returns the number of files added.
    pub fn scan_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Configuration directory not present");
            return Ok(0);
        }
        let mut found: Vec<(String, PathBuf, DocumentKind)> = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(kind) = DocumentKind::from_file_name(&name) {
                found.push((name, entry.path(), kind));
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));

        for (_, path, kind) in &found {
            let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            self.add_source(path.display().to_string(), text, *kind);
        }
        debug!(dir = %dir.display(), files = found.len(), "Scanned configuration directory");
        Ok(found.len())
    }

    pub fn scan_dirs(&mut self, dirs: &[PathBuf]) -> Result<usize> {
        let mut count = 0;
        for dir in dirs {
            count += self.scan_dir(dir)?;
        }
        Ok(count)
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Run the tests embedded in syntax documents
    pub run_tests: bool,
    /// Return the first error instead of collecting it
    pub stop_on_error: bool,
}

/// A scope used by a syntax that a color scheme cannot color
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScopeIssue {
    pub syntax: String,
    pub scheme: String,
    pub scope: String,
}

impl fmt::Display for ScopeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax {} uses scope {} which color scheme {} does not define",
            self.syntax, self.scope, self.scheme
        )
    }
}

/// Everything loaded from a set of configuration documents
#[derive(Debug, Default)]
pub struct StructConfig {
    syntaxes: SyntaxCollection,
    color_schemes: ColorSchemeMap,
    errors: Vec<Error>,
}

impl StructConfig {
    pub fn load(files: &ConfigFiles, options: LoadOptions) -> Result<Self> {
        let mut config = Self::default();

        let mut syntax_docs = Vec::new();
        let mut color_docs = Vec::new();
        for source in files.sources() {
            match ConfigDocument::parse(source.origin.as_str(), &source.text) {
                Ok(doc) => match source.kind {
                    DocumentKind::Syntax => syntax_docs.push(doc),
                    DocumentKind::Colors => color_docs.push(doc),
                },
                Err(e) => config.record(options, e)?,
            }
        }

        for doc in &syntax_docs {
            debug!(origin = doc.origin(), "Loading syntax document");
            match Self::load_syntaxes(doc, options) {
                Ok(collection) => config.syntaxes.merge(collection),
                Err(e) => config.record(options, e)?,
            }
        }

        let mut definitions = SchemeDefinitions::new();
        for doc in &color_docs {
            debug!(origin = doc.origin(), "Loading color scheme document");
            if let Err(e) = definitions.add_document(&doc.root()) {
                config.record(options, e)?;
            }
        }
        for name in definitions.concrete_names() {
            match definitions.resolve(name) {
                Ok(scheme) => {
                    config.color_schemes.insert(name.to_string(), scheme);
                }
                Err(e) => config.record(options, e)?,
            }
        }

        info!(
            syntaxes = config.syntaxes.len(),
            schemes = config.color_schemes.len(),
            errors = config.errors.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Built-in documents plus the directories named by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let files = ConfigFiles::from_settings(settings)?;
        Self::load(&files, settings.load_options())
    }

    fn load_syntaxes(doc: &ConfigDocument, options: LoadOptions) -> Result<SyntaxCollection> {
        let collection = SyntaxCollection::from_node(&doc.root())?;
        if options.run_tests {
            for syntax in collection.syntaxes() {
                syntax.run_tests()?;
            }
        }
        Ok(collection)
    }

    fn record(&mut self, options: LoadOptions, error: impl Into<Error>) -> Result<()> {
        let error = error.into();
        if options.stop_on_error {
            return Err(error);
        }
        warn!(%error, "Skipping broken configuration");
        self.errors.push(error);
        Ok(())
    }

    pub fn syntaxes(&self) -> &SyntaxCollection {
        &self.syntaxes
    }

    pub fn color_schemes(&self) -> &ColorSchemeMap {
        &self.color_schemes
    }

    pub fn color_scheme(&self, name: &str) -> Option<&ColorScheme> {
        self.color_schemes.get(name)
    }

    /// Errors collected while loading
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Cross-check every scope the syntaxes use against every scheme
    pub fn check_for_issues(&self) -> Vec<ScopeIssue> {
        let mut issues = Vec::new();
        for syntax in self.syntaxes.syntaxes() {
            for (scheme_name, scheme) in &self.color_schemes {
                for scope in syntax.used_scopes() {
                    if !scheme.has_scope(scope) {
                        let issue = ScopeIssue {
                            syntax: syntax.name().to_string(),
                            scheme: scheme_name.clone(),
                            scope: scope.clone(),
                        };
                        warn!("{}", issue);
                        issues.push(issue);
                    }
                }
            }
        }
        issues
    }
}
