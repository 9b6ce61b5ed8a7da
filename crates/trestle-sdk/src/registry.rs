//! Module registry — name-keyed table of native capabilities
//!
//! Insert-only for the lifetime of a bridge: an identifier, once bound to an
//! instance, is never rebound or removed. Concurrent readers observe either
//! the pre- or post-extension state of the table, never a partial merge.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::module::NativeModule;

/// Registry error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// An identifier was registered twice
    #[error("native module '{0}' is already registered")]
    Duplicate(String),
}

/// Registry of native modules indexed by name.
///
/// Lookup is O(1) amortized. Mutation is insert-only: [`register`] and
/// [`extend`] reject an identifier that is already bound rather than
/// overwriting it.
///
/// [`register`]: ModuleRegistry::register
/// [`extend`]: ModuleRegistry::extend
pub struct ModuleRegistry {
    modules: RwLock<FxHashMap<String, Arc<dyn NativeModule>>>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register a module under its own name.
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is already bound;
    /// the existing binding is left untouched.
    pub fn register(&self, module: Arc<dyn NativeModule>) -> Result<(), RegistryError> {
        let name = module.name().to_string();
        let mut modules = self.modules.write();
        if modules.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        modules.insert(name, module);
        Ok(())
    }

    /// Get a module by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn NativeModule>> {
        self.modules.read().get(name).cloned()
    }

    /// Check if a module is registered
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Get the names of all registered modules
    pub fn names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    /// Get the number of registered modules
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    /// Snapshot of all registered modules.
    ///
    /// The read lock is released before the snapshot is returned, so callers
    /// may invoke arbitrary module code without holding up writers.
    pub fn snapshot(&self) -> Vec<Arc<dyn NativeModule>> {
        self.modules.read().values().cloned().collect()
    }

    /// Merge another registry of *new* identifiers into this one.
    ///
    /// All-or-nothing: if any incoming name collides with an existing
    /// binding, nothing is merged and [`RegistryError::Duplicate`] names the
    /// first collision.
    pub fn extend(&self, other: ModuleRegistry) -> Result<(), RegistryError> {
        let incoming = other.modules.into_inner();
        let mut modules = self.modules.write();
        for name in incoming.keys() {
            if modules.contains_key(name) {
                return Err(RegistryError::Duplicate(name.clone()));
            }
        }
        modules.extend(incoming);
        Ok(())
    }

    /// Clear the registry. Used by the bridge during teardown only.
    pub fn clear(&self) {
        self.modules.write().clear();
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("count", &self.len())
            .finish()
    }
}
