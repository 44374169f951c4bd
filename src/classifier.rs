//! Script region classification.
//!
//! Assigns every `<script>` element of a document to exactly one role and
//! checks that the document has the expected shape: one core library
//! inclusion, one inline main script, and any number of tool or exempt
//! inclusions.

use crate::conventions::Conventions;
use crate::error::{StructuralError, snippet};
use crate::registry::SymbolRegistry;
use crate::scanner::{self, ScriptRegion};

/// The role of one script region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRole {
    /// Loads the core library bundle. Removed; becomes the core import.
    LibraryInclusion,
    /// Loads an exempt path. Left untouched.
    WhitelistedInclusion,
    /// Loads a legacy tool. Removed; becomes a tool import.
    ToolInclusion { path: String },
    /// The inline script. Rewritten into the module entry point.
    MainScript,
}

/// A region together with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRegion {
    pub region: ScriptRegion,
    pub role: ScriptRole,
}

/// The four-way partition of a document's script regions.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Every region in document order.
    pub regions: Vec<ClassifiedRegion>,
    /// Tool inclusion paths, deduplicated, in order of first appearance.
    pub tool_imports: Vec<String>,
    main_index: usize,
}

impl Classification {
    pub fn main_script(&self) -> &ScriptRegion {
        &self.regions[self.main_index].region
    }

    /// Regions whose effect is relocated into imports and which leave the document.
    pub fn removed_regions(&self) -> impl Iterator<Item = &ScriptRegion> {
        self.regions.iter().filter_map(|c| match c.role {
            ScriptRole::LibraryInclusion | ScriptRole::ToolInclusion { .. } => Some(&c.region),
            _ => None,
        })
    }
}

/// Classifies the script regions of `document`.
///
/// Rules are evaluated per region in document order; the first match wins:
/// 1. no attributes, inline content: main script (at most one)
/// 2. `src` equal to the core bundle, no content: library inclusion (at most one)
/// 3. `src` in the exempt set, no content: whitelisted inclusion
/// 4. `src` under the legacy prefix, no content: tool inclusion
/// 5. anything else: structural error
///
/// After the walk, a missing library inclusion or main script is also a
/// structural error.
pub fn classify(
    document: &str,
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Result<Classification, StructuralError> {
    let mut regions = Vec::new();
    let mut tool_imports: Vec<String> = Vec::new();
    let mut library_seen = false;
    let mut main_index = None;

    for region in scanner::script_regions(document) {
        let role = classify_region(&region, document, registry, conventions)?;
        match &role {
            ScriptRole::MainScript => {
                if main_index.is_some() {
                    return Err(StructuralError::DuplicateMainScript { line: region.line });
                }
                main_index = Some(regions.len());
            }
            ScriptRole::LibraryInclusion => {
                if library_seen {
                    return Err(StructuralError::DuplicateLibraryInclusion { line: region.line });
                }
                library_seen = true;
            }
            ScriptRole::ToolInclusion { path } => {
                if !tool_imports.contains(path) {
                    tool_imports.push(path.clone());
                }
            }
            ScriptRole::WhitelistedInclusion => {}
        }
        tracing::trace!(line = region.line, role = ?role, "classified script region");
        regions.push(ClassifiedRegion { region, role });
    }

    if !library_seen {
        return Err(StructuralError::MissingLibraryInclusion {
            core_bundle: conventions.core_bundle.clone(),
        });
    }
    let main_index = main_index.ok_or(StructuralError::MissingMainScript)?;

    Ok(Classification {
        regions,
        tool_imports,
        main_index,
    })
}

fn classify_region(
    region: &ScriptRegion,
    document: &str,
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Result<ScriptRole, StructuralError> {
    if !region.has_attributes() && region.has_content() {
        return Ok(ScriptRole::MainScript);
    }

    if let Some(src) = region.attribute("src").filter(|_| !region.has_content()) {
        if src == conventions.core_bundle {
            return Ok(ScriptRole::LibraryInclusion);
        }
        if registry.is_exempt(src) {
            return Ok(ScriptRole::WhitelistedInclusion);
        }
        if src.starts_with(&conventions.legacy_prefix) {
            return Ok(ScriptRole::ToolInclusion {
                path: src.to_string(),
            });
        }
    }

    Err(StructuralError::UnexpectedRegion {
        line: region.line,
        snippet: snippet(region.outer(document)),
    })
}
