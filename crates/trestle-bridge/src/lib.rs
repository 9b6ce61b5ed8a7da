//! Trestle Bridge - call routing between native code and a JS context
//!
//! The bridge loads a JS program, routes calls in both directions, tracks
//! execution lifecycle, and exposes a registry of native capabilities to JS
//! while exposing JS-defined capabilities back to native code.
//!
//! # Threading model
//!
//! Three logical execution contexts, statically assigned by [`QueueConfig`]:
//!
//! - the **UI-affinity thread**: the host thread that constructs and
//!   destroys the bridge (never spawned by this crate);
//! - the **JS execution thread**: everything behind [`JsExecutor`] runs
//!   here, in per-origin-thread FIFO order;
//! - the **native-modules thread**: module initialization, method
//!   invocation, and teardown hooks run here.
//!
//! Cross-context calls are message passing only. The single blocking
//! operation is [`Bridge::destroy`], which drains and joins the two
//! spawned threads before returning.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trestle_bridge::{Bridge, NoopJsExecutor};
//! use trestle_sdk::ModuleRegistry;
//!
//! let registry = ModuleRegistry::new();
//! registry.register(Arc::new(MyToastModule::new()))?;
//!
//! let bridge = Bridge::new(Box::new(NoopJsExecutor::new()), registry);
//! bridge.initialize()?;
//! bridge.run_js_bundle("assets://index.bundle")?;
//! bridge.call_function("AppRegistry", "runApplication", vec![]);
//! // ... later, on the same (UI) thread:
//! bridge.destroy()?;
//! ```

#![warn(missing_docs)]

mod bridge;
mod callbacks;
mod error;
mod executor;
mod extensions;
mod idle;
mod invoker;
mod proxy;
mod queue;
mod root;
mod sink;

pub use bridge::{Bridge, BridgeState};
pub use callbacks::{CallbackError, CallbackId};
pub use error::BridgeError;
pub use executor::{BundleSource, JsError, JsExecutor, NativeCallDispatcher, NoopJsExecutor};
pub use extensions::{ExtensionKind, ExtensionModule, ModuleResolver};
pub use idle::{IdleListener, IdleTracker};
pub use invoker::CallInvoker;
pub use proxy::{JsInterface, JsModuleHandle};
pub use queue::{MessageQueueThread, QueueConfig, QueueHandle};
pub use root::{Stage, UiRoot};

// The SDK types flow through the public API; re-export for convenience.
pub use trestle_sdk::{Args, MemoryPressure, MethodResult, ModuleRegistry, NativeModule};
