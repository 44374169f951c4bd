//! Import statement synthesis.
//!
//! Turns the core symbols found in the main script and the tool inclusions
//! removed from the document into the ordered list of module imports that
//! replaces them: the core import first, then one import per tool in
//! inclusion order.
//!
//! Imports are placed as text ahead of the first line of script code, with
//! that line's indentation, so the rest of the script keeps its bytes.

use crate::conventions::Conventions;
use crate::error::StructuralError;
use crate::registry::{SymbolRegistry, short_name};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::collections::BTreeSet;
use std::fmt;

/// One `import { ... } from '...'` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub names: Vec<String>,
    pub source: String,
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_empty() {
            write!(f, "import {{}} from '{}';", self.source)
        } else {
            write!(f, "import {{ {} }} from '{}';", self.names.join(", "), self.source)
        }
    }
}

/// Builds the ordered import list for one document.
///
/// The core import is always present, even with no names, so the core
/// module's registration side effects still run. Its names come out sorted
/// because `core` is a `BTreeSet`.
pub fn synthesize(
    core: &BTreeSet<String>,
    tool_imports: &[String],
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Vec<ImportStatement> {
    let mut imports = Vec::with_capacity(tool_imports.len() + 1);
    imports.push(ImportStatement {
        names: core.iter().cloned().collect(),
        source: conventions.core_module.clone(),
    });

    for path in tool_imports {
        let name = short_name(path);
        if !registry.is_modularized(&name) {
            tracing::warn!(path, name, "tool inclusion has no module counterpart");
        }
        imports.push(ImportStatement {
            names: vec![name],
            source: conventions.module_path(path),
        });
    }

    imports
}

/// Places `imports` ahead of the first line of code in `script`.
///
/// Each import takes the indentation of that line, and a blank line
/// separates them from the code. Every import must parse as a single module
/// statement; a tool whose short name is not a valid binding fails here.
pub fn prepend(script: &str, imports: &[ImportStatement]) -> Result<String, StructuralError> {
    validate(imports)?;

    let code_start = script
        .find(|c: char| !c.is_whitespace())
        .unwrap_or(script.len());
    let line_start = script[..code_start].rfind('\n').map_or(0, |i| i + 1);
    let indent = &script[line_start..code_start];

    let mut out = String::with_capacity(script.len() + imports.len() * 64);
    out.push_str(&script[..line_start]);
    for import in imports {
        out.push_str(indent);
        out.push_str(&import.to_string());
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&script[line_start..]);
    Ok(out)
}

fn validate(imports: &[ImportStatement]) -> Result<(), StructuralError> {
    let allocator = Allocator::default();
    for import in imports {
        let text = import.to_string();
        let ret = Parser::new(&allocator, &text, SourceType::mjs()).parse();
        if ret.panicked || !ret.errors.is_empty() || ret.program.body.len() != 1 {
            return Err(StructuralError::InvalidImport { statement: text });
        }
    }
    Ok(())
}
