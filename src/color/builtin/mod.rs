//! Color schemes compiled into the binary

use crate::config_node::ConfigDocument;

/// Origin reported in diagnostics for the bundled document
pub const ORIGIN: &str = "<builtin>/builtin.colors.yaml";

/// Raw text of the bundled color scheme document
pub const DOCUMENT: &str = include_str!("builtin.colors.yaml");

/// Parse the bundled document
pub fn document() -> crate::error::Result<ConfigDocument> {
    ConfigDocument::parse(ORIGIN, DOCUMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{load_all, Color};
    use crate::syntax::builtin as builtin_syntax;

    #[test]
    fn test_builtin_schemes() {
        let doc = document().unwrap();
        let schemes = load_all(&doc.root()).unwrap();
        let names: Vec<&str> = schemes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["dark", "light"]);
        // dark recolors the inherited assignments through its own defs
        assert_eq!(schemes["light"].user()["Error"], Color::rgb(0xc4, 0x1a, 0x16));
        assert_eq!(schemes["dark"].user()["Error"], Color::rgb(0xf4, 0x47, 0x47));
        assert_eq!(
            schemes["dark"].scope_color("Error").background,
            Color::rgb(0x1e, 0x1e, 0x1e)
        );
    }

    #[test]
    fn test_builtin_schemes_cover_builtin_syntaxes() {
        let doc = document().unwrap();
        let schemes = load_all(&doc.root()).unwrap();
        for syntax in builtin_syntax::syntaxes().unwrap().syntaxes() {
            for scope in syntax.used_scopes() {
                for (name, scheme) in &schemes {
                    assert!(scheme.has_scope(scope), "{} lacks {}", name, scope);
                }
            }
        }
    }
}
