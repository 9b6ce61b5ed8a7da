//! Extension modules and the fallback module resolver
//!
//! Extension modules are native-side extensions keyed by a fixed enum, not
//! by the open-ended string namespace of the classic registry. A properly
//! initialized bridge has an instance installed for every kind it is asked
//! for; a miss is a wiring bug and is surfaced as a fatal configuration
//! error.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use trestle_sdk::NativeModule;

use crate::error::BridgeError;

/// The fixed set of extension module kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    /// The UI manager extension driving view operations
    UiManager,
    /// The manager presenting the second-generation module registry
    TurboModuleManager,
}

impl std::fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtensionKind::UiManager => f.write_str("UiManager"),
            ExtensionKind::TurboModuleManager => f.write_str("TurboModuleManager"),
        }
    }
}

/// A native-side extension installed under an [`ExtensionKind`].
pub trait ExtensionModule: Send + Sync {
    /// The kind this extension is installed under.
    fn kind(&self) -> ExtensionKind;

    /// Called when the extension is installed into a bridge.
    fn initialize(&self) {}

    /// Called during bridge teardown.
    fn on_bridge_destroy(&self) {}
}

impl std::fmt::Debug for dyn ExtensionModule + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionModule")
            .field("kind", &self.kind())
            .finish()
    }
}

/// Secondary module resolver consulted when the classic registry has no
/// entry for a requested identifier.
///
/// Lets two registries present a unified view to JS without merging their
/// storage.
pub trait ModuleResolver: Send + Sync {
    /// Resolve a module by name, or report that this resolver does not have
    /// it either.
    fn resolve(&self, name: &str) -> Option<Arc<dyn NativeModule>>;

    /// Names this resolver can currently satisfy.
    fn module_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Table of installed extension modules, keyed by kind.
pub(crate) struct ExtensionTable {
    entries: RwLock<FxHashMap<ExtensionKind, Arc<dyn ExtensionModule>>>,
}

impl ExtensionTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Install extensions, initializing each. Re-installing a kind replaces
    /// the previous instance.
    pub(crate) fn install(&self, extensions: Vec<Arc<dyn ExtensionModule>>) {
        let mut entries = self.entries.write();
        for extension in extensions {
            extension.initialize();
            entries.insert(extension.kind(), extension);
        }
    }

    /// O(1) lookup. A missing kind is a fatal configuration error.
    pub(crate) fn get(&self, kind: ExtensionKind) -> Result<Arc<dyn ExtensionModule>, BridgeError> {
        self.entries
            .read()
            .get(&kind)
            .cloned()
            .ok_or(BridgeError::Configuration(kind))
    }

    /// Snapshot for teardown fan-out.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn ExtensionModule>> {
        self.entries.read().values().cloned().collect()
    }

    /// Clear the table during teardown.
    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeUiManager {
        initialized: AtomicUsize,
    }

    impl ExtensionModule for FakeUiManager {
        fn kind(&self) -> ExtensionKind {
            ExtensionKind::UiManager
        }

        fn initialize(&self) {
            self.initialized.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_install_and_get() {
        let table = ExtensionTable::new();
        let ui = Arc::new(FakeUiManager::default());
        table.install(vec![ui.clone()]);

        assert_eq!(ui.initialized.load(Ordering::SeqCst), 1);
        let fetched = table.get(ExtensionKind::UiManager).unwrap();
        assert_eq!(fetched.kind(), ExtensionKind::UiManager);
    }

    #[test]
    fn test_missing_kind_is_configuration_error() {
        let table = ExtensionTable::new();
        let err = table.get(ExtensionKind::TurboModuleManager).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Configuration(ExtensionKind::TurboModuleManager)
        ));
    }
}
