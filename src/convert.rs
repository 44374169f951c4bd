//! Single-document conversion.
//!
//! [`convert`] chains classification, rewriting, import synthesis and
//! reassembly for one document and turns every per-document failure into a
//! [`ConversionOutcome`]. Only a registry inconsistency escapes as an error,
//! because it invalidates every other document of the run as well.

use crate::assembler;
use crate::classifier;
use crate::conventions::Conventions;
use crate::error::{ConvertError, RegistryInconsistency, StructuralError};
use crate::imports;
use crate::registry::SymbolRegistry;
use crate::rewriter;
use crate::scanner::offset_to_line_col;
use std::collections::BTreeSet;

/// A successfully converted document and what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// The full rewritten document.
    pub text: String,
    /// Names imported from the core module, sorted.
    pub core_imports: Vec<String>,
    /// Removed tool inclusion paths, in first-appearance order.
    pub tool_imports: Vec<String>,
    /// Module tools constructed through the namespace, sorted.
    pub module_tools: Vec<String>,
    /// Namespace accesses that were not constructor calls.
    pub residual_references: usize,
}

/// The terminal state of one document's conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted(ConvertedDocument),
    /// Legacy tools referenced without a module counterpart; every one is listed.
    Rejected(BTreeSet<String>),
    StructuralError(StructuralError),
}

/// Converts one document.
///
/// Pure with respect to its inputs: the same document and registry always
/// produce the same outcome, byte for byte. All working state (tree arena,
/// symbol sets) is created inside this call.
pub fn convert(
    document: &str,
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Result<ConversionOutcome, RegistryInconsistency> {
    match try_convert(document, registry, conventions) {
        Ok(outcome) => Ok(outcome),
        Err(ConvertError::Structural(err)) => Ok(ConversionOutcome::StructuralError(err)),
        Err(ConvertError::Registry(err)) => Err(err),
    }
}

fn try_convert(
    document: &str,
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Result<ConversionOutcome, ConvertError> {
    let classification = classifier::classify(document, registry, conventions)?;
    let main = classification.main_script();
    let (first_line, _) = offset_to_line_col(document, main.content_start);

    let script = rewriter::rewrite_main_script(
        main.content(document),
        first_line,
        registry,
        conventions,
    )?;

    if !script.symbols.is_resolved() {
        return Ok(ConversionOutcome::Rejected(script.symbols.unresolved));
    }

    let imports = imports::synthesize(
        &script.symbols.core,
        &classification.tool_imports,
        registry,
        conventions,
    );
    let module_code = imports::prepend(&script.code, &imports)?;
    let text = assembler::assemble(document, &classification, &module_code);
    Ok(ConversionOutcome::Converted(ConvertedDocument {
        text,
        core_imports: script.symbols.core.into_iter().collect(),
        tool_imports: classification.tool_imports,
        module_tools: script.symbols.module_tools.into_iter().collect(),
        residual_references: script.residual_references,
    }))
}
