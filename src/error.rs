//! Error taxonomy.
//!
//! A [`StructuralError`] rejects one document whose shape does not match the
//! expected pattern. A [`RegistryInconsistency`] means the symbol registry
//! itself is wrong and the whole run has to stop.

use thiserror::Error;

/// A document-shape violation. Fatal for the document, never for the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unexpected <script> structure at line {line}: {snippet}")]
    UnexpectedRegion { line: usize, snippet: String },

    #[error("second main <script> at line {line}; exactly one is allowed")]
    DuplicateMainScript { line: usize },

    #[error("second core library inclusion at line {line}; exactly one is allowed")]
    DuplicateLibraryInclusion { line: usize },

    #[error("no core library inclusion <script src=\"{core_bundle}\"> found")]
    MissingLibraryInclusion { core_bundle: String },

    #[error("no main <script> found")]
    MissingMainScript,

    #[error("main script does not parse at line {line}: {message}")]
    ScriptSyntax { line: usize, message: String },

    #[error("unexpected constructor callee ({kind}) at line {line}: {snippet}")]
    UnexpectedCallee {
        kind: &'static str,
        line: usize,
        snippet: String,
    },

    #[error("unexpected member object ({kind}) at line {line}: {snippet}")]
    UnexpectedMemberObject {
        kind: &'static str,
        line: usize,
        snippet: String,
    },

    #[error("constructor on namespace '{namespace}' at line {line}: {snippet}")]
    NamespaceMismatch {
        namespace: String,
        line: usize,
        snippet: String,
    },

    #[error("synthesized import is not valid JavaScript: {statement}")]
    InvalidImport { statement: String },
}

/// A symbol resolved as both a core symbol and a module tool.
///
/// The registry derives `is_core` from the legacy tool set and
/// `is_modularized` from the module tool set; a name satisfying both means
/// the two directory scans disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("registry inconsistency: '{name}' is both a core symbol and a module tool")]
pub struct RegistryInconsistency {
    pub name: String,
}

/// Either failure a single conversion step can produce.
///
/// The conversion entry point turns `Structural` into an outcome value and
/// lets `Registry` escape to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Registry(#[from] RegistryInconsistency),
}

/// Failures while filtering the examples manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("manifest is not valid JSON after stripping the assignment: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest category '{0}' is not a list of example names")]
    Shape(String),
}

/// Truncates a source excerpt for inclusion in an error message.
pub(crate) fn snippet(source: &str) -> String {
    const MAX: usize = 80;
    let flat: String = source.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_collapses_whitespace() {
        assert_eq!(snippet("<script\n\t\tsrc=\"a.js\">"), "<script src=\"a.js\">");
    }

    #[test]
    fn snippet_truncates_long_sources() {
        let long = "x".repeat(200);
        let s = snippet(&long);
        assert_eq!(s.len(), 83);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn structural_errors_name_the_offending_region() {
        let err = StructuralError::UnexpectedRegion {
            line: 12,
            snippet: "<script type=\"x-shader\">".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected <script> structure at line 12: <script type=\"x-shader\">"
        );
    }
}
