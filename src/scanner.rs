//! Document scanner.
//!
//! Collects the HTML documents of an examples directory and locates the
//! `<script>` elements inside each one. Every region keeps the byte span of
//! the whole element and of its inline content, so later stages can edit the
//! document in place without re-serializing markup they never touched.

use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static SCRIPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("script pattern is valid")
});

static ATTR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

/// One `<script>` element of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRegion {
    /// Byte offset of `<script`.
    pub start: usize,
    /// Byte offset just past `</script>`.
    pub end: usize,
    /// Byte offset of the first byte of inline content.
    pub content_start: usize,
    /// Byte offset of the closing tag, i.e. just past the inline content.
    pub content_end: usize,
    /// Attributes in source order. Names are lowercased; valueless attributes have `None`.
    pub attributes: Vec<(String, Option<String>)>,
    /// Line of `<script`, 1-indexed.
    pub line: usize,
}

impl ScriptRegion {
    /// Value of the named attribute, if present with a value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Inline code between the tags.
    pub fn content<'d>(&self, document: &'d str) -> &'d str {
        &document[self.content_start..self.content_end]
    }

    /// Any inline text at all, whitespace included, counts as content.
    pub fn has_content(&self) -> bool {
        self.content_end > self.content_start
    }

    /// The whole element as written in the document.
    pub fn outer<'d>(&self, document: &'d str) -> &'d str {
        &document[self.start..self.end]
    }
}

/// Collects the `.html` documents directly inside `dir`, sorted by file name.
///
/// `only` restricts the result to the given file names (with or without the
/// `.html` extension); `exclude` drops names matching any glob pattern.
pub fn collect_documents(
    dir: &Path,
    only: &[String],
    exclude: &[glob::Pattern],
) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path().extension().is_none_or(|ext| ext != "html")
        {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !only.is_empty() && !only.iter().any(|o| o == name || format!("{o}.html") == name) {
            continue;
        }
        if exclude.iter().any(|p| p.matches(name)) {
            continue;
        }
        documents.push(entry.into_path());
    }

    Ok(documents)
}

/// Locates every `<script>` element of `document`, in document order.
///
/// Elements inside HTML comments are ignored. Script content is treated as
/// raw text up to the first `</script>`, as browsers do.
pub fn script_regions(document: &str) -> Vec<ScriptRegion> {
    let masked = mask_comments(document);
    let mut regions = Vec::new();

    for caps in SCRIPT_REGEX.captures_iter(&masked) {
        let (Some(whole), Some(attrs), Some(content)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let attr_source = &document[attrs.start()..attrs.end()];
        let (line, _) = offset_to_line_col(document, whole.start());
        regions.push(ScriptRegion {
            start: whole.start(),
            end: whole.end(),
            content_start: content.start(),
            content_end: content.end(),
            attributes: parse_attributes(attr_source),
            line,
        });
    }

    regions
}

/// Parses the attribute list of a start tag.
fn parse_attributes(source: &str) -> Vec<(String, Option<String>)> {
    ATTR_REGEX
        .captures_iter(source)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            Some((name, value))
        })
        .collect()
}

/// Blanks out HTML comments byte-for-byte so offsets stay valid.
fn mask_comments(document: &str) -> String {
    let mut bytes = document.as_bytes().to_vec();
    for comment in COMMENT_REGEX.find_iter(document) {
        bytes[comment.range()].fill(b' ');
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Converts a byte offset into a 1-indexed `(line, column)` pair.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
