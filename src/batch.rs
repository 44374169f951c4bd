//! Batch conversion of an examples directory.
//!
//! Loads every document, converts them in parallel against one shared
//! registry, and builds a serializable report. Writing is a separate,
//! sequential step that only ever touches converted documents.

use crate::conventions::Conventions;
use crate::convert::{ConversionOutcome, convert};
use crate::registry::SymbolRegistry;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// One document and the outcome of its conversion.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub path: PathBuf,
    pub outcome: ConversionOutcome,
}

impl DocumentResult {
    /// File name of the document, e.g. `webgl_camera.html`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Converts `documents` in parallel.
///
/// Results come back in the order of `documents`. A registry inconsistency in
/// any document fails the whole batch; read errors do too.
pub fn convert_documents(
    documents: &[PathBuf],
    registry: &SymbolRegistry,
    conventions: &Conventions,
) -> Result<Vec<DocumentResult>> {
    documents
        .par_iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let outcome = convert(&text, registry, conventions)
                .with_context(|| format!("Aborting run while converting {}", path.display()))?;
            log_outcome(path, &outcome);
            Ok(DocumentResult {
                path: path.clone(),
                outcome,
            })
        })
        .collect()
}

fn log_outcome(path: &Path, outcome: &ConversionOutcome) {
    let document = path.display();
    match outcome {
        ConversionOutcome::Converted(doc) => tracing::info!(
            %document,
            core = doc.core_imports.len(),
            tools = doc.tool_imports.len(),
            "converted"
        ),
        ConversionOutcome::Rejected(missing) => tracing::warn!(
            %document,
            missing = ?missing,
            "missing module tools"
        ),
        ConversionOutcome::StructuralError(err) => tracing::warn!(
            %document,
            error = %err,
            "unexpected document structure"
        ),
    }
}

/// Writes every converted document into `output_dir` under its original name.
///
/// `confirm` is asked once per document and may veto the write. Returns the
/// names that were written.
pub fn write_converted<F>(
    results: &[DocumentResult],
    output_dir: &Path,
    mut confirm: F,
) -> Result<HashSet<String>>
where
    F: FnMut(&DocumentResult) -> Result<bool>,
{
    let mut written = HashSet::new();

    for result in results {
        let ConversionOutcome::Converted(doc) = &result.outcome else {
            continue;
        };
        if !confirm(result)? {
            continue;
        }
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let name = result.name();
        let target = output_dir.join(&name);
        std::fs::write(&target, &doc.text)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        written.insert(name);
    }

    Ok(written)
}

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub results: Vec<DocumentResult>,
    pub report: BatchReport,
    /// Names of the documents written to the output directory.
    pub written: HashSet<String>,
}

/// Converts `documents`, then writes converted ones into `output_dir`.
///
/// Nothing is written when `output_dir` is `None`, or when any document hits
/// a registry inconsistency.
pub fn run_batch<F>(
    documents: &[PathBuf],
    registry: &SymbolRegistry,
    conventions: &Conventions,
    output_dir: Option<&Path>,
    confirm: F,
) -> Result<BatchRun>
where
    F: FnMut(&DocumentResult) -> Result<bool>,
{
    let results = convert_documents(documents, registry, conventions)?;
    let report = BatchReport::new(&results);
    let written = match output_dir {
        Some(dir) => write_converted(&results, dir, confirm)?,
        None => HashSet::new(),
    };
    Ok(BatchRun {
        results,
        report,
        written,
    })
}

/// Per-document line of a batch report.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub core_imports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_imports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub residual_references: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Converted,
    Rejected,
    StructuralError,
}

/// Summary statistics of a batch run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Summary {
    pub documents: usize,
    pub converted: usize,
    pub rejected: usize,
    pub structural_errors: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} examples converted out of {}",
            self.converted, self.documents
        )
    }
}

/// Complete batch report.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub summary: Summary,
}

impl BatchReport {
    pub fn new(results: &[DocumentResult]) -> Self {
        let mut summary = Summary {
            documents: results.len(),
            ..Summary::default()
        };
        let documents = results
            .iter()
            .map(|result| {
                let mut report = DocumentReport {
                    document: result.name(),
                    status: Status::Converted,
                    core_imports: Vec::new(),
                    tool_imports: Vec::new(),
                    missing: Vec::new(),
                    reason: None,
                    residual_references: 0,
                };
                match &result.outcome {
                    ConversionOutcome::Converted(doc) => {
                        summary.converted += 1;
                        report.core_imports = doc.core_imports.clone();
                        report.tool_imports = doc.tool_imports.clone();
                        report.residual_references = doc.residual_references;
                    }
                    ConversionOutcome::Rejected(missing) => {
                        summary.rejected += 1;
                        report.status = Status::Rejected;
                        report.missing = missing.iter().cloned().collect();
                    }
                    ConversionOutcome::StructuralError(err) => {
                        summary.structural_errors += 1;
                        report.status = Status::StructuralError;
                        report.reason = Some(err.to_string());
                    }
                }
                report
            })
            .collect();

        Self { documents, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CONVERTIBLE: &str = "<script src=\"../build/three.js\"></script>\n<script>\nvar s = new THREE.Scene();\n</script>\n";
    const REJECTED: &str = "<script src=\"../build/three.js\"></script>\n<script>\nvar s = new THREE.Sky();\n</script>\n";
    const BROKEN: &str = "<script>\nvar s = new THREE.Scene();\n</script>\n";

    fn setup() -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (name, text) in [
            ("a.html", CONVERTIBLE),
            ("b.html", REJECTED),
            ("c.html", BROKEN),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, text).unwrap();
            paths.push(path);
        }
        (dir, paths)
    }

    fn registry() -> SymbolRegistry {
        SymbolRegistry::new(["Sky"], Vec::<String>::new(), Vec::<String>::new())
    }

    #[test]
    fn converts_in_input_order_and_summarizes() {
        let (_dir, paths) = setup();
        let results = convert_documents(&paths, &registry(), &Conventions::default()).unwrap();
        let names: Vec<_> = results.iter().map(DocumentResult::name).collect();
        assert_eq!(names, vec!["a.html", "b.html", "c.html"]);

        let report = BatchReport::new(&results);
        assert_eq!(report.summary.documents, 3);
        assert_eq!(report.summary.converted, 1);
        assert_eq!(report.summary.rejected, 1);
        assert_eq!(report.summary.structural_errors, 1);
        assert_eq!(report.documents[1].missing, vec!["Sky"]);
        assert!(report.documents[2].reason.is_some());
    }

    #[test]
    fn writes_only_converted_documents() {
        let (dir, paths) = setup();
        let results = convert_documents(&paths, &registry(), &Conventions::default()).unwrap();
        let out = dir.path().join("jsm/html");

        let written = write_converted(&results, &out, |_| Ok(true)).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written.contains("a.html"));
        assert!(out.join("a.html").exists());
        assert!(!out.join("b.html").exists());
        assert!(!out.join("c.html").exists());
    }

    #[test]
    fn confirmation_can_veto_writes() {
        let (dir, paths) = setup();
        let results = convert_documents(&paths, &registry(), &Conventions::default()).unwrap();
        let out = dir.path().join("out");

        let written = write_converted(&results, &out, |_| Ok(false)).unwrap();
        assert!(written.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn registry_inconsistency_aborts_the_batch() {
        let (_dir, paths) = setup();
        let registry = SymbolRegistry::new(
            Vec::<String>::new(),
            ["Scene"],
            Vec::<String>::new(),
        );
        let err = convert_documents(&paths, &registry, &Conventions::default()).unwrap_err();
        assert!(
            err.chain()
                .any(|cause| cause.to_string().contains("registry inconsistency"))
        );
    }

    #[test]
    fn run_batch_without_output_dir_writes_nothing() {
        let (dir, paths) = setup();
        let run = run_batch(&paths, &registry(), &Conventions::default(), None, |_| {
            panic!("no confirmation expected without an output directory")
        })
        .unwrap();
        assert!(run.written.is_empty());
        assert_eq!(run.report.summary.to_string(), "1 examples converted out of 3");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn report_serializes_status_in_snake_case() {
        let (_dir, paths) = setup();
        let results = convert_documents(&paths, &registry(), &Conventions::default()).unwrap();
        let json = serde_json::to_value(BatchReport::new(&results)).unwrap();
        assert_eq!(json["documents"][0]["status"], "converted");
        assert_eq!(json["documents"][2]["status"], "structural_error");
        assert_eq!(json["summary"]["converted"], 1);
    }
}
