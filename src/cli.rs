//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: converting examples,
//! checking them without writing, inspecting the symbol registry, or listing
//! the documents that would be processed.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Convert global-namespace examples into ES module examples.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the examples and tool trees live.
#[derive(Debug, Clone, ClapArgs)]
pub struct Layout {
    /// Directory holding the example documents.
    #[arg(short, long, default_value = "examples")]
    pub source_dir: PathBuf,

    /// Directory of legacy tool scripts.
    #[arg(long, default_value = "examples/js")]
    pub legacy_dir: PathBuf,

    /// Directory of module tool scripts.
    #[arg(long, default_value = "examples/jsm")]
    pub module_dir: PathBuf,

    /// JSON file overriding the namespace, bundle paths, prefixes, and exempt paths.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Additional inclusion paths to leave untouched (e.g., "js/libs/dat.gui.min.js").
    #[arg(long)]
    pub exempt: Vec<String>,
}

/// Which documents to process.
#[derive(Debug, Clone, ClapArgs)]
pub struct Selection {
    /// Only process these documents (file name, with or without `.html`).
    #[arg(long)]
    pub only: Vec<String>,

    /// Glob patterns for documents to skip (e.g., "webgl_loader_*", "css3d_*.html").
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert every example and write the converted ones to the output directory.
    Convert {
        #[command(flatten)]
        layout: Layout,

        #[command(flatten)]
        selection: Selection,

        /// Directory receiving converted documents.
        #[arg(short, long, default_value = "examples/jsm/html")]
        output_dir: PathBuf,

        /// Also write a filtered copy of `files.js` listing only converted examples.
        #[arg(long)]
        manifest: bool,

        /// Report what would be written without touching the filesystem.
        #[arg(long)]
        dry_run: bool,

        /// Interactively confirm each converted document before writing it.
        #[arg(short, long)]
        interactive: bool,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert every example in memory and report outcomes without writing.
    Check {
        #[command(flatten)]
        layout: Layout,

        #[command(flatten)]
        selection: Selection,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the symbol registry built from the tool directories.
    Registry {
        #[command(flatten)]
        layout: Layout,

        /// List every tool name, not just the counts.
        #[arg(long)]
        names: bool,
    },

    /// List documents that would be processed without converting them.
    Scan {
        /// Directory holding the example documents.
        #[arg(short, long, default_value = "examples")]
        source_dir: PathBuf,

        #[command(flatten)]
        selection: Selection,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn convert_uses_examples_layout_by_default() {
        let args = Args::parse_from(["jsm-modularize", "convert"]);
        let Commands::Convert {
            layout, output_dir, ..
        } = args.command
        else {
            panic!("expected convert");
        };
        assert_eq!(layout.source_dir, PathBuf::from("examples"));
        assert_eq!(layout.legacy_dir, PathBuf::from("examples/js"));
        assert_eq!(layout.module_dir, PathBuf::from("examples/jsm"));
        assert_eq!(output_dir, PathBuf::from("examples/jsm/html"));
    }

    #[test]
    fn selection_flags_repeat() {
        let args = Args::parse_from([
            "jsm-modularize",
            "check",
            "--only",
            "webgl_camera",
            "--exclude",
            "css3d_*",
            "--exclude",
            "misc_*",
        ]);
        let Commands::Check { selection, .. } = args.command else {
            panic!("expected check");
        };
        assert_eq!(selection.only, vec!["webgl_camera"]);
        assert_eq!(selection.exclude, vec!["css3d_*", "misc_*"]);
    }
}
