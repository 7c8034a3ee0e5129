//! Immutable model registry snapshots
//!
//! A `ModelRegistry` is built once from a manifest and never mutated:
//! scanners take a snapshot at construction time and keep it for the whole
//! pass. Rebuilds (the hosting session reloading its model set) construct a
//! fresh registry and swap the shared `Arc`, so in-flight compiles keep
//! seeing the snapshot they started with.

use crate::symbols::error::SymbolResult;
use crate::symbols::manifest::ModelManifest;
use crate::symbols::table::{Symbol, SymbolKind, SymbolTable};
use std::sync::{Arc, PoisonError, RwLock};

/// Primitive type names every session starts with, manifest or not.
const BUILTIN_PRIMITIVES: &[&str] = &["boolean", "double", "float", "int", "long", "string"];

/// One immutable registry snapshot: the symbol table plus the derived
/// keyword vectors the command scanner injects as lexeme rules.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    table: SymbolTable,
    native_keywords: Vec<String>,
    component_keywords: Vec<String>,
}

impl ModelRegistry {
    /// Registry with only the builtin primitives registered.
    pub fn empty() -> Self {
        Self {
            table: Self::seed_primitives(SymbolTable::new()),
            native_keywords: Vec::new(),
            component_keywords: Vec::new(),
        }
    }

    fn seed_primitives(mut table: SymbolTable) -> SymbolTable {
        for name in BUILTIN_PRIMITIVES {
            // Manifest entries are inserted first and take precedence over
            // the builtin spelling. With the duplicate check done here, the
            // insert can only fail at the symbol cap.
            if !table.contains(name) {
                if let Ok(symbol) = Symbol::primitive(*name) {
                    let _ = table.insert(symbol);
                }
            }
        }
        table
    }

    /// Build a snapshot from a parsed manifest.
    pub fn from_manifest(manifest: &ModelManifest) -> SymbolResult<Self> {
        let mut table = SymbolTable::new();

        for entry in &manifest.native_models {
            table.insert(Symbol::native_model(entry.name.clone())?)?;
        }
        for entry in &manifest.component_models {
            table.insert(Symbol::component_model(
                entry.name.clone(),
                entry.default_key,
                entry.exchange.clone(),
            )?)?;
        }
        for entry in &manifest.classes {
            table.insert(Symbol::class(entry.name.clone())?)?;
        }
        for entry in &manifest.primitives {
            table.insert(Symbol::primitive(entry.name.clone())?)?;
        }

        let table = Self::seed_primitives(table);
        let native_keywords = table.identifiers_of_kind(SymbolKind::NativeModel);
        let component_keywords = table.identifiers_of_kind(SymbolKind::ComponentModel);

        Ok(Self {
            table,
            native_keywords,
            component_keywords,
        })
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Resolve a raw type name through the snapshot's table.
    pub fn lookup(&self, raw: &str) -> Option<&Symbol> {
        self.table.lookup(raw)
    }

    /// Registered native model names, longest first.
    pub fn native_keywords(&self) -> &[String] {
        &self.native_keywords
    }

    /// Registered component model names, longest first.
    pub fn component_keywords(&self) -> &[String] {
        &self.component_keywords
    }

    pub fn symbol_count(&self) -> usize {
        self.table.len()
    }

    pub fn has_models(&self) -> bool {
        !self.native_keywords.is_empty() || !self.component_keywords.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Shared handle over the current registry snapshot.
///
/// Readers clone the `Arc` out; a rebuild writes a new one in. The lock is
/// held only for the pointer exchange, never across parsing.
#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<ModelRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// The snapshot to use for one compile pass.
    pub fn snapshot(&self) -> Arc<ModelRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current snapshot. Existing snapshots stay valid.
    pub fn swap(&self, registry: ModelRegistry) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(registry);
    }

    /// Rebuild from a manifest and swap on success; on failure the current
    /// snapshot is left untouched.
    pub fn rebuild_from_manifest(&self, manifest: &ModelManifest) -> SymbolResult<()> {
        let rebuilt = ModelRegistry::from_manifest(manifest)?;
        self.swap(rebuilt);
        Ok(())
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(ModelRegistry::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sample_manifest() -> ModelManifest {
        ModelManifest::parse(
            r#"
[[native_model]]
name = "h.flow"

[[component_model]]
name = "h_ab"

[component_model.exchange]
pit = "GridCoverage"

[[class]]
name = "GridCoverage"
"#,
            Path::new("models.toml"),
        )
        .unwrap()
    }

    #[test]
    fn from_manifest_registers_all_kinds() {
        let registry = ModelRegistry::from_manifest(&sample_manifest()).unwrap();

        assert_eq!(registry.lookup("h.flow").unwrap().kind, SymbolKind::NativeModel);
        assert_eq!(
            registry.lookup("H_AB").unwrap().kind,
            SymbolKind::ComponentModel
        );
        assert_eq!(
            registry.lookup("gridcoverage").unwrap().kind,
            SymbolKind::Class
        );
        assert!(registry.has_models());
    }

    #[test]
    fn builtin_primitives_are_always_present() {
        let registry = ModelRegistry::empty();
        assert_eq!(registry.lookup("double").unwrap().kind, SymbolKind::Primitive);
        assert_eq!(registry.lookup("string").unwrap().kind, SymbolKind::Primitive);
        assert!(!registry.has_models());

        let from_manifest = ModelRegistry::from_manifest(&sample_manifest()).unwrap();
        assert_eq!(
            from_manifest.lookup("int").unwrap().kind,
            SymbolKind::Primitive
        );
    }

    #[test]
    fn keyword_vectors_follow_registration() {
        let registry = ModelRegistry::from_manifest(&sample_manifest()).unwrap();
        assert_eq!(registry.native_keywords(), &["h.flow".to_string()]);
        assert_eq!(registry.component_keywords(), &["h_ab".to_string()]);
    }

    #[test]
    fn handle_swap_preserves_existing_snapshots() {
        let handle = RegistryHandle::default();
        let before = handle.snapshot();
        assert!(!before.has_models());

        handle
            .rebuild_from_manifest(&sample_manifest())
            .unwrap();

        let after = handle.snapshot();
        assert!(after.has_models());
        // The pre-swap snapshot is still the empty registry.
        assert!(!before.has_models());
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn failed_rebuild_keeps_current_snapshot() {
        let handle = RegistryHandle::new(
            ModelRegistry::from_manifest(&sample_manifest()).unwrap(),
        );

        let broken = ModelManifest::parse(
            r#"
[[native_model]]
name = "dup"

[[class]]
name = "DUP"
"#,
            Path::new("models.toml"),
        )
        .unwrap();

        assert!(handle.rebuild_from_manifest(&broken).is_err());
        assert!(handle.snapshot().has_models());
    }
}
