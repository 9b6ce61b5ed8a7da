//! NativeModule trait — the capability contract native modules implement
//!
//! Dispatch is keyed on a stable string identifier (the module name) plus a
//! method name, never on a reflective type token. The bridge resolves the
//! module by name and hands it positional JSON arguments.

use std::sync::Arc;

/// Positional argument list crossing the native/JS boundary.
///
/// Every value is JSON; anything that cannot be represented as JSON cannot
/// cross the bridge.
pub type Args = Vec<serde_json::Value>;

/// Result of a native method invocation
pub enum MethodResult {
    /// Call handled successfully, returned a value
    Value(serde_json::Value),
    /// Call handled successfully, returned nothing
    Void,
    /// Method name not recognized by this module
    Unhandled,
    /// Call failed with an error
    Error(String),
}

impl MethodResult {
    /// Create a successful result from anything JSON-representable
    #[inline]
    pub fn value(val: impl Into<serde_json::Value>) -> Self {
        Self::Value(val.into())
    }
}

impl From<ModuleError> for MethodResult {
    fn from(err: ModuleError) -> Self {
        MethodResult::Error(err.to_string())
    }
}

/// Memory pressure levels forwarded to modules by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPressure {
    /// The UI is no longer visible; caches may be trimmed
    UiHidden,
    /// The process is under moderate memory pressure
    Moderate,
    /// The process is close to being killed; release everything releasable
    Critical,
}

/// Native module error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModuleError {
    /// Wrong number of arguments
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch {
        /// Expected argument count
        expected: usize,
        /// Actual argument count
        got: usize,
    },

    /// Argument present but of the wrong JSON type
    #[error("argument {index}: expected {expected}")]
    TypeMismatch {
        /// Position of the offending argument
        index: usize,
        /// Expected JSON type name
        expected: &'static str,
    },

    /// Module-level error
    #[error("{0}")]
    Module(String),
}

/// Back-channel a module uses to call into JS.
///
/// Implemented by the bridge and handed to modules at initialization time.
/// The bridge-side implementation holds only a weak reference to the bridge,
/// so a module keeping this context alive never prevents bridge teardown.
pub trait ModuleContext: Send + Sync {
    /// Enqueue a fire-and-forget call to a JS module/method.
    ///
    /// Returns `false` if the bridge is already gone or destroyed; the call
    /// is dropped in that case.
    fn call_js(&self, module: &str, method: &str, args: Args) -> bool;

    /// Settle a single-use JS callback by its numeric id.
    ///
    /// Returns `false` if the id was unknown, already settled, or the bridge
    /// is gone.
    fn settle_callback(&self, callback_id: u64, args: Args) -> bool;
}

/// A context that drops every call. Useful for tests and detached modules.
pub struct NoopContext;

impl ModuleContext for NoopContext {
    fn call_js(&self, _module: &str, _method: &str, _args: Args) -> bool {
        false
    }

    fn settle_callback(&self, _callback_id: u64, _args: Args) -> bool {
        false
    }
}

/// Trait implemented by native capabilities exposed to JS.
///
/// The bridge is oblivious to what a module does beyond its name and this
/// contract. Methods are dispatched by name with positional JSON arguments;
/// a module returns [`MethodResult::Unhandled`] for names it does not know.
///
/// # Thread Safety
///
/// `invoke` runs on the bridge's native-modules thread; lifecycle hooks run
/// there too. Modules shared with other threads must synchronize internally.
pub trait NativeModule: Send + Sync {
    /// Stable identifier this module is registered and resolved under.
    fn name(&self) -> &str;

    /// Post-construction setup. Called exactly once by the bridge, on the
    /// native-modules thread, before any JS-originated call is serviced.
    fn initialize(&self, _ctx: Arc<dyn ModuleContext>) {}

    /// Dispatch a method call routed from JS.
    fn invoke(&self, method: &str, args: &[serde_json::Value]) -> MethodResult;

    /// Called during bridge teardown, before the native-modules thread is
    /// joined. The module must not call back into JS from here.
    fn on_bridge_destroy(&self) {}

    /// Memory pressure notification forwarded from the host.
    fn on_memory_pressure(&self, _level: MemoryPressure) {}
}

impl std::fmt::Debug for dyn NativeModule + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModule")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl NativeModule for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn invoke(&self, method: &str, args: &[serde_json::Value]) -> MethodResult {
            match method {
                "echo" => match args.first() {
                    Some(v) => MethodResult::Value(v.clone()),
                    None => ModuleError::ArityMismatch {
                        expected: 1,
                        got: 0,
                    }
                    .into(),
                },
                _ => MethodResult::Unhandled,
            }
        }
    }

    #[test]
    fn test_invoke_dispatch() {
        let module = Echo;
        match module.invoke("echo", &[serde_json::json!("hi")]) {
            MethodResult::Value(v) => assert_eq!(v, serde_json::json!("hi")),
            _ => panic!("expected value"),
        }
        assert!(matches!(module.invoke("nope", &[]), MethodResult::Unhandled));
    }

    #[test]
    fn test_module_error_into_result() {
        let result: MethodResult = ModuleError::Module("boom".to_string()).into();
        match result {
            MethodResult::Error(msg) => assert_eq!(msg, "boom"),
            _ => panic!("expected error"),
        }
    }

    #[test]
    fn test_noop_context_drops_calls() {
        let ctx = NoopContext;
        assert!(!ctx.call_js("A", "f", vec![]));
        assert!(!ctx.settle_callback(1, vec![]));
    }
}
