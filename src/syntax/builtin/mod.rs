//! Syntaxes compiled into the binary

use super::SyntaxCollection;
use crate::config_node::ConfigDocument;
use crate::error::Result;

/// Origin reported in diagnostics for the bundled document
pub const ORIGIN: &str = "<builtin>/builtin.syntax.yaml";

/// Raw text of the bundled syntax document
pub const DOCUMENT: &str = include_str!("builtin.syntax.yaml");

/// Parse the bundled syntaxes
pub fn syntaxes() -> Result<SyntaxCollection> {
    let doc = ConfigDocument::parse(ORIGIN, DOCUMENT)?;
    Ok(SyntaxCollection::from_node(&doc.root())?)
}
