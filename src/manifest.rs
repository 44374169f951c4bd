//! Examples manifest filtering.
//!
//! The examples index is a script assigning a JSON-like object of categories
//! to `files`. After a batch run, the module examples index keeps only the
//! entries whose document was converted.

use crate::error::ManifestError;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static ASSIGNMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*var\s+files\s*=\s*").expect("assignment pattern is valid")
});

static TRAILING_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("trailing comma pattern is valid"));

/// Filters manifest text, keeping entries `name` for which `name.html` is in `converted`.
///
/// Categories keep their original order, including categories left empty.
pub fn filter_manifest(contents: &str, converted: &HashSet<String>) -> Result<String, ManifestError> {
    let body = ASSIGNMENT_REGEX.replace(contents, "");
    let body = body.trim_end().trim_end_matches(';');
    let body = TRAILING_COMMA_REGEX.replace_all(body, "$1");

    let mut categories: Map<String, Value> = serde_json::from_str(&body)?;
    for (category, entries) in categories.iter_mut() {
        let Value::Array(items) = entries else {
            return Err(ManifestError::Shape(category.clone()));
        };
        let mut kept = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            let Value::String(name) = &item else {
                return Err(ManifestError::Shape(category.clone()));
            };
            if converted.contains(&format!("{name}.html")) {
                kept.push(item);
            }
        }
        *items = kept;
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    categories.serialize(&mut serializer)?;

    Ok(format!("var files = {};", String::from_utf8_lossy(&out)))
}

/// Reads the manifest at `src`, filters it, and writes the result to `dst`.
pub fn filter_manifest_file(
    src: &Path,
    dst: &Path,
    converted: &HashSet<String>,
) -> Result<(), ManifestError> {
    let contents = std::fs::read_to_string(src)?;
    let filtered = filter_manifest(&contents, converted)?;
    std::fs::write(dst, filtered)?;
    Ok(())
}
