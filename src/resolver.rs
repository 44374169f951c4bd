//! Constructor name resolution.
//!
//! Decides, for the member name of a `new <namespace>.<Name>(...)`
//! expression, which universe the name belongs to, and collects the
//! per-document bookkeeping the import synthesizer and the final gate need.

use crate::error::RegistryInconsistency;
use crate::registry::SymbolRegistry;
use std::collections::BTreeSet;

/// Where a namespaced constructor name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Part of the core library; imported from the core module.
    CoreSymbol,
    /// A tool with a module counterpart; imported through its tool inclusion.
    ResolvedToolSymbol,
    /// A legacy tool with no module counterpart.
    UnresolvedSymbol,
}

/// Resolves a member name against the registry.
///
/// Fails when the name is both core (absent from the legacy tools) and
/// modularized, which only an inconsistent registry can produce.
pub fn resolve(name: &str, registry: &SymbolRegistry) -> Result<Resolution, RegistryInconsistency> {
    let is_core = registry.is_core(name);
    let is_modularized = registry.is_modularized(name);
    tracing::debug!(name, is_core, is_modularized, "resolved namespaced constructor");

    match (is_core, is_modularized) {
        (true, true) => Err(RegistryInconsistency {
            name: name.to_string(),
        }),
        (true, false) => Ok(Resolution::CoreSymbol),
        (false, true) => Ok(Resolution::ResolvedToolSymbol),
        (false, false) => Ok(Resolution::UnresolvedSymbol),
    }
}

/// Symbols accumulated while walking one document's main script.
///
/// Created fresh for every conversion; never shared between documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSymbols {
    /// Names to import from the core module.
    pub core: BTreeSet<String>,
    /// Module tool names referenced through the namespace.
    pub module_tools: BTreeSet<String>,
    /// Legacy tool names with no module counterpart.
    pub unresolved: BTreeSet<String>,
}

impl ResolvedSymbols {
    /// Resolves `name` and records it in the matching set.
    pub fn record(
        &mut self,
        name: &str,
        registry: &SymbolRegistry,
    ) -> Result<Resolution, RegistryInconsistency> {
        let resolution = resolve(name, registry)?;
        let set = match resolution {
            Resolution::CoreSymbol => &mut self.core,
            Resolution::ResolvedToolSymbol => &mut self.module_tools,
            Resolution::UnresolvedSymbol => &mut self.unresolved,
        };
        set.insert(name.to_string());
        Ok(resolution)
    }

    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SymbolRegistry {
        SymbolRegistry::new(
            ["OrbitControls", "EffectComposer", "Sky"],
            ["OrbitControls", "EffectComposer", "Pass"],
            Vec::<String>::new(),
        )
    }

    #[test]
    fn names_outside_legacy_tools_are_core() {
        assert_eq!(resolve("Scene", &registry()), Ok(Resolution::CoreSymbol));
        assert_eq!(resolve("Mesh", &registry()), Ok(Resolution::CoreSymbol));
    }

    #[test]
    fn modularized_legacy_tools_resolve() {
        assert_eq!(
            resolve("OrbitControls", &registry()),
            Ok(Resolution::ResolvedToolSymbol)
        );
    }

    #[test]
    fn legacy_only_tools_are_unresolved() {
        assert_eq!(resolve("Sky", &registry()), Ok(Resolution::UnresolvedSymbol));
    }

    #[test]
    fn core_and_modularized_is_an_inconsistency() {
        assert_eq!(
            resolve("Pass", &registry()),
            Err(RegistryInconsistency {
                name: "Pass".to_string()
            })
        );
    }

    #[test]
    fn record_sorts_names_into_sets() {
        let registry = registry();
        let mut symbols = ResolvedSymbols::default();
        for name in ["Scene", "OrbitControls", "Sky", "Mesh", "Scene"] {
            symbols.record(name, &registry).unwrap();
        }
        assert_eq!(
            symbols.core.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Mesh", "Scene"]
        );
        assert!(symbols.module_tools.contains("OrbitControls"));
        assert_eq!(symbols.unresolved.len(), 1);
        assert!(!symbols.is_resolved());
    }

    #[test]
    fn record_propagates_inconsistency() {
        let mut symbols = ResolvedSymbols::default();
        assert!(symbols.record("Pass", &registry()).is_err());
        assert!(symbols.core.is_empty());
    }
}
