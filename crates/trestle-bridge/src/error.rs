//! Bridge error types.

use crate::callbacks::CallbackError;
use crate::extensions::ExtensionKind;

/// Errors surfaced by bridge operations.
///
/// `Lifecycle` and `Configuration` are unrecoverable for the bridge
/// instance that produced them. `Callback` and `Serialization` reject only
/// the offending call; the bridge stays usable. `ModuleNotFound` is a
/// wiring bug when the caller expected the module to exist, and a plain
/// absent result when probing.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Operation invoked on a destroyed bridge, off its required thread, or
    /// out of lifecycle order
    #[error("bridge lifecycle violation: {0}")]
    Lifecycle(String),

    /// Requested native module has no registered instance and no fallback
    /// resolver satisfies it
    #[error("native module '{0}' is not registered")]
    ModuleNotFound(String),

    /// Registry mutation rejected
    #[error(transparent)]
    Registry(#[from] trestle_sdk::RegistryError),

    /// Callback id unknown or already settled
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// Malformed payload crossing the native/JS boundary
    #[error("malformed JSON payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested extension kind has no installed instance
    #[error("extension module {0} is not installed")]
    Configuration(ExtensionKind),
}
