//! Symbol registry construction and lookup.
//!
//! Walks the legacy tool directory and the module tool directory to collect
//! the short names of every tool file, then answers the two membership
//! questions the resolver asks about a constructor name: is it a core symbol
//! (not a legacy tool), and is it available as a module tool.
//!
//! The registry is built once per run and shared read-only by every
//! document conversion.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use walkdir::WalkDir;

/// Precomputed tool name sets for one run.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    legacy_tool_names: HashSet<String>,
    module_tool_names: HashSet<String>,
    exempt_paths: HashSet<String>,
}

impl SymbolRegistry {
    /// Builds a registry from explicit name sets.
    pub fn new<L, M, E>(legacy_tool_names: L, module_tool_names: M, exempt_paths: E) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            legacy_tool_names: legacy_tool_names.into_iter().map(Into::into).collect(),
            module_tool_names: module_tool_names.into_iter().map(Into::into).collect(),
            exempt_paths: exempt_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Scans `legacy_dir` and `module_dir` for `.js` files and collects their short names.
    pub fn from_dirs(legacy_dir: &Path, module_dir: &Path, exempt_paths: &[String]) -> Result<Self> {
        let legacy = list_files(legacy_dir, "js")
            .with_context(|| format!("Failed to scan legacy tools in {}", legacy_dir.display()))?;
        let modules = list_files(module_dir, "js")
            .with_context(|| format!("Failed to scan module tools in {}", module_dir.display()))?;

        let registry = Self::new(
            legacy.iter().map(|p| short_name(p)),
            modules.iter().map(|p| short_name(p)),
            exempt_paths.iter().cloned(),
        );
        tracing::debug!(
            legacy = registry.legacy_tool_names.len(),
            modules = registry.module_tool_names.len(),
            exempt = registry.exempt_paths.len(),
            "built symbol registry"
        );
        Ok(registry)
    }

    /// A name is a core symbol unless some legacy tool file carries it.
    pub fn is_core(&self, name: &str) -> bool {
        !self.legacy_tool_names.contains(name)
    }

    /// Whether a module tool file carries this name.
    pub fn is_modularized(&self, name: &str) -> bool {
        self.module_tool_names.contains(name)
    }

    /// Whether an inclusion path is left untouched by conversion.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.contains(path)
    }

    pub fn legacy_tool_names(&self) -> &HashSet<String> {
        &self.legacy_tool_names
    }

    pub fn module_tool_names(&self) -> &HashSet<String> {
        &self.module_tool_names
    }

    /// Module tool names with no legacy counterpart.
    ///
    /// Each of these would resolve as both core and modularized if a document
    /// constructed it through the namespace, which aborts the run. Listing them
    /// up front lets the `registry` command surface the problem early.
    pub fn inconsistent_names(&self) -> BTreeSet<String> {
        self.module_tool_names
            .iter()
            .filter(|name| self.is_core(name))
            .cloned()
            .collect()
    }
}

/// Recursively lists files with extension `ext` under `root`.
///
/// Returned paths are relative to `root`, `/`-separated, sorted.
pub fn list_files(root: &Path, ext: &str) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path().extension().is_none_or(|e| e != ext)
        {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }

    Ok(files)
}

/// Short name of a tool file: the last path segment without its `.js` extension.
///
/// `js/controls/OrbitControls.js` becomes `OrbitControls`, and
/// `libs/stats.min.js` becomes `stats.min`.
pub fn short_name(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(".js").unwrap_or(file).to_string()
}

/// Prints a registry summary to stdout.
///
/// With `list_names`, every legacy and module tool name is listed (sorted)
/// under its heading.
pub fn print_summary(registry: &SymbolRegistry, list_names: bool) {
    let sorted = |set: &HashSet<String>| {
        let mut names: Vec<_> = set.iter().cloned().collect();
        names.sort();
        names
    };

    println!(
        "{} {} legacy tools, {} module tools, {} exempt paths",
        "registry:".bold(),
        registry.legacy_tool_names.len(),
        registry.module_tool_names.len(),
        registry.exempt_paths.len()
    );

    for path in sorted(&registry.exempt_paths) {
        println!("  {} {}", "exempt".dimmed(), path);
    }

    if list_names {
        println!("{}", "legacy:".bold());
        for name in sorted(&registry.legacy_tool_names) {
            let marker = if registry.is_modularized(&name) {
                "module".green()
            } else {
                "legacy only".yellow()
            };
            println!("  {} {}", name, format!("({})", marker).dimmed());
        }
        println!("{}", "modules:".bold());
        for name in sorted(&registry.module_tool_names) {
            println!("  {}", name);
        }
    }

    let inconsistent = registry.inconsistent_names();
    if inconsistent.is_empty() {
        println!("{} registry is consistent", "ok:".green().bold());
    } else {
        println!(
            "{} {} module tool(s) without a legacy counterpart:",
            "warn:".yellow().bold(),
            inconsistent.len()
        );
        for name in inconsistent {
            println!("  {}", name.red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// tool").unwrap();
    }

    #[test]
    fn short_name_strips_directory_and_extension() {
        assert_eq!(short_name("js/controls/OrbitControls.js"), "OrbitControls");
        assert_eq!(short_name("/libs/stats.min.js"), "stats.min");
        assert_eq!(short_name("Detector"), "Detector");
    }

    #[test]
    fn list_files_recurses_and_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "controls/OrbitControls.js");
        touch(dir.path(), "loaders/GLTFLoader.js");
        touch(dir.path(), "loaders/README.md");
        touch(dir.path(), "WebGL.js");

        let files = list_files(dir.path(), "js").unwrap();
        assert_eq!(
            files,
            vec!["WebGL.js", "controls/OrbitControls.js", "loaders/GLTFLoader.js"]
        );
    }

    #[test]
    fn list_files_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("nope"), "js").is_err());
    }

    #[test]
    fn from_dirs_collects_short_names() {
        let legacy = tempfile::tempdir().unwrap();
        let modules = tempfile::tempdir().unwrap();
        touch(legacy.path(), "controls/OrbitControls.js");
        touch(legacy.path(), "controls/TrackballControls.js");
        touch(modules.path(), "controls/OrbitControls.js");

        let registry =
            SymbolRegistry::from_dirs(legacy.path(), modules.path(), &["js/WebGL.js".into()])
                .unwrap();

        assert!(!registry.is_core("OrbitControls"));
        assert!(registry.is_modularized("OrbitControls"));
        assert!(!registry.is_core("TrackballControls"));
        assert!(!registry.is_modularized("TrackballControls"));
        assert!(registry.is_core("Scene"));
        assert!(registry.is_exempt("js/WebGL.js"));
        assert!(!registry.is_exempt("js/controls/OrbitControls.js"));
    }

    #[test]
    fn consistent_registry_has_no_inconsistent_names() {
        let registry = SymbolRegistry::new(
            ["OrbitControls", "Sky"],
            ["OrbitControls"],
            Vec::<String>::new(),
        );
        assert!(registry.inconsistent_names().is_empty());
    }

    #[test]
    fn module_only_names_are_inconsistent() {
        let registry = SymbolRegistry::new(
            ["OrbitControls"],
            ["OrbitControls", "NodeMaterial", "Pass"],
            Vec::<String>::new(),
        );
        let names: Vec<_> = registry.inconsistent_names().into_iter().collect();
        assert_eq!(names, vec!["NodeMaterial", "Pass"]);
    }
}
