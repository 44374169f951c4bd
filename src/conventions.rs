//! Textual conventions of the example tree being converted.
//!
//! The defaults describe the three.js examples layout: a `THREE` global built
//! from `../build/three.js`, legacy tools under `js/`, and their module
//! counterparts under `jsm/`. A JSON file can override any subset of them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Paths, prefixes, and the global alias that define the input document shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Global alias of the core library, e.g. `THREE` in `new THREE.Scene()`.
    pub namespace: String,
    /// `src` of the script element that loads the core library bundle.
    pub core_bundle: String,
    /// Import source of the core library module.
    pub core_module: String,
    /// `src` prefix identifying legacy tool inclusions.
    pub legacy_prefix: String,
    /// Replacement for `legacy_prefix` in synthesized tool imports.
    pub module_prefix: String,
    /// Inclusion paths that are never converted.
    pub exempt_paths: Vec<String>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            namespace: "THREE".to_string(),
            core_bundle: "../build/three.js".to_string(),
            core_module: "../build/three.module.js".to_string(),
            legacy_prefix: "js/".to_string(),
            module_prefix: "./jsm/".to_string(),
            exempt_paths: vec!["js/WebGL.js".to_string(), "js/libs/stats.min.js".to_string()],
        }
    }
}

impl Conventions {
    /// Loads conventions from a JSON file. Keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse conventions in {}", path.display()))
    }

    /// Maps a legacy tool inclusion path onto its module import path.
    ///
    /// `js/controls/OrbitControls.js` becomes `./jsm/controls/OrbitControls.js`.
    /// Paths outside `legacy_prefix` are returned unchanged.
    pub fn module_path(&self, legacy_path: &str) -> String {
        match legacy_path.strip_prefix(&self.legacy_prefix) {
            Some(rest) => format!("{}{}", self.module_prefix, rest),
            None => legacy_path.to_string(),
        }
    }
}
