//! JS executor seam — the boundary behind which the JS engine lives
//!
//! The bridge never touches engine internals. Everything JS-side happens
//! through [`JsExecutor`], and every method of that trait is driven on the
//! JS execution thread only. JS-originated calls re-enter the bridge
//! through the [`NativeCallDispatcher`] the executor receives at
//! initialization.

use std::sync::Arc;

use trestle_sdk::Args;

use crate::callbacks::CallbackId;
use crate::error::BridgeError;

/// Identifier of a loadable JS program: a URL or a file path. Opaque to the
/// bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSource(String);

impl BundleSource {
    /// The source string as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BundleSource {
    fn from(s: String) -> Self {
        BundleSource(s)
    }
}

impl From<&str> for BundleSource {
    fn from(s: &str) -> Self {
        BundleSource(s.to_string())
    }
}

impl std::fmt::Display for BundleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// JS-side execution failure reported by an executor.
#[derive(Debug, Clone, thiserror::Error)]
#[error("JS execution error: {0}")]
pub struct JsError(pub String);

/// How JS-originated work re-enters the bridge.
///
/// Implemented by the bridge; the implementation holds only a weak
/// reference back, so an executor keeping its dispatcher alive never
/// prevents bridge teardown. After teardown every method degrades to a
/// no-op failure.
pub trait NativeCallDispatcher: Send + Sync {
    /// Route a JS call to a named native module method. The invocation is
    /// enqueued onto the native-modules thread; this never blocks.
    fn call_native(&self, module: &str, method: &str, args: Args) -> Result<(), BridgeError>;

    /// Issue a fresh single-use callback id for a callback the JS side is
    /// passing to native code.
    fn issue_callback(&self) -> CallbackId;

    /// Signal that the JS side finished processing a dispatched batch.
    /// Drives the idle/busy tracker.
    fn on_batch_complete(&self);

    /// Resolve a registered lazy code segment by id.
    fn segment_path(&self, segment_id: u32) -> Option<String>;
}

/// The JS engine boundary.
///
/// The bridge owns one executor and drives it exclusively on the JS
/// execution thread, so implementations need `Send` but not `Sync`.
pub trait JsExecutor: Send + 'static {
    /// Attach the bridge-facing dispatcher. Called once, before any other
    /// method, when the bridge is initialized.
    fn initialize(&mut self, dispatcher: Arc<dyn NativeCallDispatcher>);

    /// Load and execute a JS program.
    fn load_bundle(&mut self, source: &BundleSource) -> Result<(), JsError>;

    /// Invoke a named JS module method with positional arguments.
    fn call_function(
        &mut self,
        module: &str,
        method: &str,
        args: &[serde_json::Value],
    ) -> Result<(), JsError>;

    /// Resolve a previously issued JS callback with the given arguments.
    /// The bridge has already invalidated the id.
    fn invoke_callback(&mut self, id: CallbackId, args: &[serde_json::Value])
        -> Result<(), JsError>;

    /// Inject a value into the JS global scope.
    fn set_global(&mut self, name: &str, value: serde_json::Value) -> Result<(), JsError>;

    /// Record a lazily loadable code segment with the engine. Engines that
    /// do not split bundles can ignore this.
    fn register_segment(&mut self, _segment_id: u32, _path: &str) -> Result<(), JsError> {
        Ok(())
    }

    /// Tear down the engine. Called once during bridge destruction, before
    /// the JS thread is joined.
    fn destroy(&mut self) {}
}

/// An executor that discards every call, acknowledging each dispatched
/// batch immediately. Useful for tests and for hosts that wire the bridge
/// before an engine exists.
#[derive(Default)]
pub struct NoopJsExecutor {
    dispatcher: Option<Arc<dyn NativeCallDispatcher>>,
}

impl NoopJsExecutor {
    /// Create a detached no-op executor.
    pub fn new() -> Self {
        Self::default()
    }

    fn ack_batch(&self) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.on_batch_complete();
        }
    }
}

impl JsExecutor for NoopJsExecutor {
    fn initialize(&mut self, dispatcher: Arc<dyn NativeCallDispatcher>) {
        self.dispatcher = Some(dispatcher);
    }

    fn load_bundle(&mut self, _source: &BundleSource) -> Result<(), JsError> {
        Ok(())
    }

    fn call_function(
        &mut self,
        _module: &str,
        _method: &str,
        _args: &[serde_json::Value],
    ) -> Result<(), JsError> {
        self.ack_batch();
        Ok(())
    }

    fn invoke_callback(
        &mut self,
        _id: CallbackId,
        _args: &[serde_json::Value],
    ) -> Result<(), JsError> {
        self.ack_batch();
        Ok(())
    }

    fn set_global(&mut self, _name: &str, _value: serde_json::Value) -> Result<(), JsError> {
        Ok(())
    }
}
