//! jsm-modularize: Convert global-namespace examples into ES module examples.
//!
//! Scans an examples directory for documents that load the core library as a
//! global and construct objects through its namespace, rewrites each main
//! script into a module with explicit imports, and writes the documents that
//! convert cleanly.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands, Layout, Selection};
use colored::Colorize;
use jsm_modularize::batch::{self, BatchReport, DocumentResult, Status};
use jsm_modularize::manifest;
use jsm_modularize::registry::{self, SymbolRegistry};
use jsm_modularize::scanner;
use jsm_modularize::{ConversionOutcome, Conventions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const MANIFEST_FILE: &str = "files.js";

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Convert {
            layout,
            selection,
            output_dir,
            manifest,
            dry_run,
            interactive,
            json,
            verbose,
        } => {
            init_tracing(verbose);
            cmd_convert(
                &layout,
                &selection,
                &output_dir,
                manifest,
                dry_run,
                interactive,
                json,
                verbose,
            )
        }
        Commands::Check {
            layout,
            selection,
            json,
            verbose,
        } => {
            init_tracing(verbose);
            cmd_check(&layout, &selection, json, verbose)
        }
        Commands::Registry { layout, names } => {
            init_tracing(false);
            cmd_registry(&layout, names)
        }
        Commands::Scan {
            source_dir,
            selection,
        } => {
            init_tracing(false);
            cmd_scan(&source_dir, &selection)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    layout: &Layout,
    selection: &Selection,
    output_dir: &Path,
    write_manifest: bool,
    dry_run: bool,
    interactive: bool,
    json_output: bool,
    verbose: bool,
) -> Result<()> {
    let conventions = load_conventions(layout)?;
    let registry = build_registry(layout, &conventions, verbose)?;
    let documents = select_documents(&layout.source_dir, selection)?;

    let target = (!dry_run).then_some(output_dir);
    let run = batch::run_batch(&documents, &registry, &conventions, target, |result| {
        if interactive {
            confirm_write(result, output_dir)
        } else {
            Ok(true)
        }
    })?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        print_report(&run.report, verbose);
        print_writes(&run.results, output_dir, dry_run, &run.written);
    }

    if write_manifest && !dry_run {
        let src = layout.source_dir.join(MANIFEST_FILE);
        let dst = output_dir.join(MANIFEST_FILE);
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        manifest::filter_manifest_file(&src, &dst, &run.written)
            .with_context(|| format!("Failed to filter manifest {}", src.display()))?;
        if !json_output {
            println!(
                "{} {} ({} entries kept)",
                "manifest:".cyan().bold(),
                dst.display(),
                run.written.len()
            );
        }
    }

    Ok(())
}

fn cmd_check(layout: &Layout, selection: &Selection, json_output: bool, verbose: bool) -> Result<()> {
    let conventions = load_conventions(layout)?;
    let registry = build_registry(layout, &conventions, verbose)?;
    let documents = select_documents(&layout.source_dir, selection)?;

    let results = batch::convert_documents(&documents, &registry, &conventions)?;
    let report = BatchReport::new(&results);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, verbose);
    }

    Ok(())
}

fn cmd_registry(layout: &Layout, list_names: bool) -> Result<()> {
    let conventions = load_conventions(layout)?;
    let registry = build_registry(layout, &conventions, false)?;
    registry::print_summary(&registry, list_names);
    Ok(())
}

fn cmd_scan(source_dir: &Path, selection: &Selection) -> Result<()> {
    let documents = select_documents(source_dir, selection)?;

    println!("Would convert {} documents:", documents.len());
    for document in documents {
        println!("  {}", document.display());
    }

    Ok(())
}

fn load_conventions(layout: &Layout) -> Result<Conventions> {
    let mut conventions = match &layout.config {
        Some(path) => Conventions::load(path)?,
        None => Conventions::default(),
    };
    for path in &layout.exempt {
        if !conventions.exempt_paths.contains(path) {
            conventions.exempt_paths.push(path.clone());
        }
    }
    Ok(conventions)
}

fn build_registry(layout: &Layout, conventions: &Conventions, verbose: bool) -> Result<SymbolRegistry> {
    let registry =
        SymbolRegistry::from_dirs(&layout.legacy_dir, &layout.module_dir, &conventions.exempt_paths)?;

    if verbose {
        eprintln!(
            "{} Registry holds {} legacy and {} module tools",
            "info:".blue().bold(),
            registry.legacy_tool_names().len(),
            registry.module_tool_names().len()
        );
    }

    Ok(registry)
}

fn select_documents(source_dir: &Path, selection: &Selection) -> Result<Vec<PathBuf>> {
    let exclude = selection
        .exclude
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern '{}'", p)))
        .collect::<Result<Vec<_>>>()?;

    scanner::collect_documents(source_dir, &selection.only, &exclude)
        .with_context(|| format!("Failed to list documents in {}", source_dir.display()))
}

fn confirm_write(result: &DocumentResult, output_dir: &Path) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Write {}?",
            output_dir.join(result.name()).display()
        ))
        .default(true)
        .interact()
        .context("Failed to read confirmation")
}

fn print_report(report: &BatchReport, verbose: bool) {
    let s = &report.summary;

    if verbose {
        println!(
            "\n{} Documents: {} ({} converted, {} rejected, {} structural errors)",
            "Diagnostics:".bold(),
            s.documents,
            s.converted,
            s.rejected,
            s.structural_errors
        );
    }

    for document in &report.documents {
        match document.status {
            Status::Converted => {
                if verbose {
                    println!("  {} {}", "ok:".green().bold(), document.document);
                }
                if document.residual_references > 0 {
                    println!(
                        "  {} {} {}",
                        "info:".blue().bold(),
                        document.document,
                        format!(
                            "({} namespace reference(s) left as-is)",
                            document.residual_references
                        )
                        .dimmed()
                    );
                }
            }
            Status::Rejected => println!(
                "  {} {} {}",
                "skip:".yellow().bold(),
                document.document,
                format!("(no module for {})", document.missing.join(", ")).dimmed()
            ),
            Status::StructuralError => println!(
                "  {} {} {}",
                "error:".red().bold(),
                document.document,
                format!("({})", document.reason.as_deref().unwrap_or("unknown")).dimmed()
            ),
        }
    }

    println!("\n{} {}", "Done:".bold(), s);
}

fn print_writes(
    results: &[DocumentResult],
    output_dir: &Path,
    dry_run: bool,
    written: &std::collections::HashSet<String>,
) {
    for result in results {
        if !matches!(result.outcome, ConversionOutcome::Converted(_)) {
            continue;
        }
        let name = result.name();
        let target = output_dir.join(&name);
        if dry_run {
            println!("{} {}", "Would write:".yellow().bold(), target.display());
        } else if written.contains(&name) {
            println!("{} {}", "Wrote:".green().bold(), target.display());
        }
    }

    if dry_run {
        println!("\n{} Run without --dry-run to write files", "hint:".cyan().bold());
    }
}
