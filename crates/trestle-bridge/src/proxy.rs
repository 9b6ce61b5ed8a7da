//! JS interface surface — proxies for JS-defined modules
//!
//! Native code talks to JS-defined capabilities through [`JsModuleHandle`]:
//! a proxy whose calls are routed through the bridge's call-function path.
//! Every call is fire-and-forget; nothing here blocks. A typed facade can
//! be layered on top by implementing [`JsInterface`].

use std::sync::Arc;

use trestle_sdk::Args;

use crate::sink::JsCallSink;

/// Proxy for a named JS-side module.
///
/// Handles stay valid after bridge destruction; calls on a dead handle are
/// dropped, matching the bridge's own `call_function` behavior.
#[derive(Clone)]
pub struct JsModuleHandle {
    module: String,
    sink: Arc<JsCallSink>,
}

impl JsModuleHandle {
    pub(crate) fn new(module: String, sink: Arc<JsCallSink>) -> Self {
        Self { module, sink }
    }

    /// The JS module name this handle routes to.
    pub fn module_name(&self) -> &str {
        &self.module
    }

    /// Invoke a method on the JS module with positional arguments.
    /// Fire-and-forget: returns `false` only if the call was dropped.
    pub fn call(&self, method: &str, args: Args) -> bool {
        self.sink.call_function(&self.module, method, args)
    }
}

impl std::fmt::Debug for JsModuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsModuleHandle")
            .field("module", &self.module)
            .finish()
    }
}

/// A typed facade over a JS module.
///
/// Implementors name the JS module they front and wrap a raw
/// [`JsModuleHandle`]; the bridge's `get_js_interface` builds them.
///
/// # Example
///
/// ```ignore
/// struct AppEvents(JsModuleHandle);
///
/// impl JsInterface for AppEvents {
///     fn module_name() -> &'static str {
///         "AppEvents"
///     }
///
///     fn from_handle(handle: JsModuleHandle) -> Self {
///         AppEvents(handle)
///     }
/// }
///
/// impl AppEvents {
///     fn emit(&self, name: &str) {
///         self.0.call("emit", vec![name.into()]);
///     }
/// }
/// ```
pub trait JsInterface: Sized {
    /// Name of the JS module this interface fronts.
    fn module_name() -> &'static str;

    /// Wrap the raw handle.
    fn from_handle(handle: JsModuleHandle) -> Self;
}
