//! Bridge orchestrator — lifecycle, call routing, and module hosting
//!
//! One `Bridge` exists per application instance. It owns the module
//! registry and the JS executor, shares its [`CallInvoker`] with native
//! capability objects, and walks a one-way lifecycle:
//!
//! `UNINITIALIZED → INITIALIZED → BUNDLE_RUNNING → DESTROYED`
//!
//! `DESTROYED` is terminal. The only operation valid afterward is
//! [`Bridge::is_destroyed`]; references resolved earlier may still be read,
//! and calls through them are dropped rather than crashing the caller.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex, RwLock};
use trestle_sdk::{
    Args, MemoryPressure, MethodResult, ModuleContext, ModuleRegistry, NativeModule,
};

use crate::callbacks::{CallbackId, CallbackRegistry};
use crate::error::BridgeError;
use crate::executor::{BundleSource, JsExecutor, NativeCallDispatcher};
use crate::extensions::{ExtensionKind, ExtensionModule, ExtensionTable, ModuleResolver};
use crate::idle::{IdleListener, IdleTracker};
use crate::invoker::CallInvoker;
use crate::proxy::{JsInterface, JsModuleHandle};
use crate::queue::QueueConfig;
use crate::root::{Stage, UiRoot};
use crate::sink::JsCallSink;

/// Lifecycle state of a [`Bridge`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BridgeState {
    /// Created, native modules not yet initialized
    Uninitialized = 0,
    /// Native modules initialized, no bundle executed yet
    Initialized = 1,
    /// A JS bundle has loaded and run
    BundleRunning = 2,
    /// Torn down; terminal
    Destroyed = 3,
}

impl BridgeState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => BridgeState::Uninitialized,
            1 => BridgeState::Initialized,
            2 => BridgeState::BundleRunning,
            _ => BridgeState::Destroyed,
        }
    }
}

/// Gate synchronizing bundle-load observation.
///
/// While a load is in flight, readers of `has_run_js_bundle` wait for the
/// result instead of observing a partial state.
#[derive(Default)]
struct LoadState {
    loading: bool,
    loaded: bool,
}

struct LoadGate {
    state: Mutex<LoadState>,
    cond: Condvar,
}

impl LoadGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(LoadState::default()),
            cond: Condvar::new(),
        }
    }
}

/// The call-routing bridge between native code and a JS execution context.
///
/// Constructed on the UI-affinity thread, which it captures for the
/// [`destroy`] thread check. See the crate docs for the threading model.
///
/// [`destroy`]: Bridge::destroy
pub struct Bridge {
    state: AtomicU8,
    destroyed: Arc<AtomicBool>,
    ui_thread: ThreadId,
    queues: Mutex<Option<QueueConfig>>,
    invoker: CallInvoker,
    executor: Arc<Mutex<Box<dyn JsExecutor>>>,
    sink: Arc<JsCallSink>,
    registry: Arc<ModuleRegistry>,
    fallback: RwLock<Option<Arc<dyn ModuleResolver>>>,
    extensions: ExtensionTable,
    callbacks: CallbackRegistry,
    idle: Arc<IdleTracker>,
    segments: DashMap<u32, String>,
    source_url: Mutex<Option<String>>,
    load_gate: LoadGate,
    next_root_tag: AtomicI32,
    self_weak: Weak<Bridge>,
}

impl Bridge {
    /// Create a bridge around a JS executor and a pre-built module
    /// registry. Must be called on the UI-affinity thread; the JS and
    /// native-modules threads are spawned here.
    pub fn new(executor: Box<dyn JsExecutor>, registry: ModuleRegistry) -> Arc<Self> {
        let queues = QueueConfig::new();
        let invoker = CallInvoker::new(queues.js_handle(), queues.native_handle());
        let executor = Arc::new(Mutex::new(executor));
        let idle = Arc::new(IdleTracker::new());
        let destroyed = Arc::new(AtomicBool::new(false));
        let sink = Arc::new(JsCallSink::new(
            queues.js_handle(),
            executor.clone(),
            idle.clone(),
            destroyed.clone(),
        ));

        Arc::new_cyclic(|weak| Self {
            state: AtomicU8::new(BridgeState::Uninitialized as u8),
            destroyed,
            ui_thread: thread::current().id(),
            queues: Mutex::new(Some(queues)),
            invoker,
            executor,
            sink,
            registry: Arc::new(registry),
            fallback: RwLock::new(None),
            extensions: ExtensionTable::new(),
            callbacks: CallbackRegistry::new(),
            idle,
            segments: DashMap::new(),
            source_url: Mutex::new(None),
            load_gate: LoadGate::new(),
            next_root_tag: AtomicI32::new(1),
            self_weak: weak.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        BridgeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Initialize the executor and all native modules that require
    /// post-construction setup. Must run exactly once, before any
    /// JS-originated native call is serviced.
    pub fn initialize(self: &Arc<Self>) -> Result<(), BridgeError> {
        self.state
            .compare_exchange(
                BridgeState::Uninitialized as u8,
                BridgeState::Initialized as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|actual| {
                BridgeError::Lifecycle(format!(
                    "initialize called in state {:?}",
                    BridgeState::from_u8(actual)
                ))
            })?;

        let dispatcher: Arc<dyn NativeCallDispatcher> = Arc::new(BridgeDispatcher {
            bridge: Arc::downgrade(self),
        });
        let executor = self.executor.clone();
        self.invoker.invoke_on_js(move || {
            executor.lock().initialize(dispatcher);
        });

        let ctx: Arc<dyn ModuleContext> = Arc::new(BridgeModuleContext {
            bridge: Arc::downgrade(self),
        });
        let modules = self.registry.snapshot();
        self.invoker.invoke_on_native(move || {
            for module in modules {
                module.initialize(ctx.clone());
            }
        });

        tracing::debug!("bridge initialized");
        Ok(())
    }

    /// Load and execute the JS program on the JS thread.
    ///
    /// Returns once the load is dispatched; concurrent callers of
    /// [`has_run_js_bundle`] block until the load settles, so nobody
    /// observes a partial state. A bundle runs at most once per bridge.
    ///
    /// [`has_run_js_bundle`]: Bridge::has_run_js_bundle
    pub fn run_js_bundle(&self, source: impl Into<BundleSource>) -> Result<(), BridgeError> {
        let source = source.into();
        match self.state() {
            BridgeState::Initialized => {}
            other => {
                return Err(BridgeError::Lifecycle(format!(
                    "run_js_bundle called in state {:?}",
                    other
                )))
            }
        }

        {
            let mut load = self.load_gate.state.lock();
            if load.loading || load.loaded {
                return Err(BridgeError::Lifecycle(
                    "a JS bundle has already run on this bridge".to_string(),
                ));
            }
            load.loading = true;
        }
        *self.source_url.lock() = Some(source.as_str().to_string());

        let executor = self.executor.clone();
        let gate_result = self.with_self_on_js(move |bridge| {
            let result = executor.lock().load_bundle(&source);
            {
                let mut load = bridge.load_gate.state.lock();
                load.loading = false;
                load.loaded = result.is_ok();
            }
            bridge.load_gate.cond.notify_all();
            match result {
                Ok(()) => {
                    let _ = bridge.state.compare_exchange(
                        BridgeState::Initialized as u8,
                        BridgeState::BundleRunning as u8,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                    tracing::info!(source = %source, "JS bundle loaded");
                }
                Err(err) => {
                    tracing::error!(source = %source, %err, "JS bundle failed to load");
                }
            }
        });

        if !gate_result {
            // Queue already gone; nobody will settle the gate, so do it here.
            let mut load = self.load_gate.state.lock();
            load.loading = false;
            drop(load);
            self.load_gate.cond.notify_all();
            return Err(BridgeError::Lifecycle(
                "bridge destroyed before bundle could be dispatched".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a JS bundle has finished loading and running. Blocks while a
    /// load is in flight; never reports `true` early.
    pub fn has_run_js_bundle(&self) -> bool {
        let mut load = self.load_gate.state.lock();
        while load.loading {
            self.load_gate.cond.wait(&mut load);
        }
        load.loaded
    }

    /// Identifier of the most recently loaded program, or `None` if no
    /// bundle was ever dispatched.
    pub fn get_source_url(&self) -> Option<String> {
        self.source_url.lock().clone()
    }

    /// Tear down the bridge: notify modules and the executor, then drain
    /// and join the JS and native-modules threads. Must run on the
    /// UI-affinity thread. Idempotent; a second call is a no-op.
    pub fn destroy(&self) -> Result<(), BridgeError> {
        if thread::current().id() != self.ui_thread {
            return Err(BridgeError::Lifecycle(
                "destroy must be called from the UI thread".to_string(),
            ));
        }

        let prev = self
            .state
            .swap(BridgeState::Destroyed as u8, Ordering::AcqRel);
        if prev == BridgeState::Destroyed as u8 {
            return Ok(());
        }
        self.destroyed.store(true, Ordering::Release);

        let Some(mut queues) = self.queues.lock().take() else {
            return Ok(());
        };

        // Teardown jobs drain ahead of the queues' shutdown sentinels.
        let modules = self.registry.snapshot();
        let extensions = self.extensions.snapshot();
        queues.native_handle().run(move || {
            for module in &modules {
                module.on_bridge_destroy();
            }
            for extension in &extensions {
                extension.on_bridge_destroy();
            }
        });
        let executor = self.executor.clone();
        queues.js_handle().run(move || {
            executor.lock().destroy();
        });

        queues.destroy();

        self.registry.clear();
        self.extensions.clear();
        *self.fallback.write() = None;

        tracing::info!("bridge destroyed");
        Ok(())
    }

    /// Lock-free destroyed predicate, safe from any thread.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Call routing (native → JS)
    // ------------------------------------------------------------------

    /// Enqueue an invocation of a named JS module/method. Fire-and-forget;
    /// calls issued from one native thread reach JS in issuance order.
    /// Returns `false` if the call was dropped (bridge destroyed).
    pub fn call_function(&self, module: &str, method: &str, args: Args) -> bool {
        self.sink.call_function(module, method, args)
    }

    /// Resolve a previously issued JS callback with the given arguments,
    /// invalidating its id. An unknown or already-settled id is a
    /// [`BridgeError::Callback`]; the bridge stays operational.
    pub fn invoke_callback(&self, id: CallbackId, args: Args) -> Result<(), BridgeError> {
        if self.is_destroyed() {
            tracing::warn!(id = id.as_u64(), "dropping callback: bridge destroyed");
            return Ok(());
        }
        self.callbacks.settle(id).map_err(|err| {
            tracing::warn!(%err, "rejected callback resolution");
            BridgeError::from(err)
        })?;
        self.sink.invoke_callback(id, args);
        Ok(())
    }

    /// Inject a JSON-encoded value into the JS global scope. The payload
    /// must be valid JSON; a malformed payload rejects only this call.
    pub fn set_global_variable(&self, name: &str, json_value: &str) -> Result<(), BridgeError> {
        let value: serde_json::Value = serde_json::from_str(json_value)?;
        if self.is_destroyed() {
            return Err(BridgeError::Lifecycle(
                "set_global_variable on a destroyed bridge".to_string(),
            ));
        }
        let executor = self.executor.clone();
        let name = name.to_string();
        self.invoker.invoke_on_js(move || {
            if let Err(err) = executor.lock().set_global(&name, value) {
                tracing::error!(%name, %err, "global injection failed");
            }
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Module registry surface (JS → native)
    // ------------------------------------------------------------------

    /// Resolve a native module, consulting the fallback resolver on a
    /// classic-registry miss. Absence is a wiring bug at this call site.
    pub fn get_native_module(&self, name: &str) -> Result<Arc<dyn NativeModule>, BridgeError> {
        if self.is_destroyed() {
            return Err(BridgeError::Lifecycle(
                "module lookup on a destroyed bridge".to_string(),
            ));
        }
        self.lookup_native_module(name)
            .ok_or_else(|| BridgeError::ModuleNotFound(name.to_string()))
    }

    /// Probe for a native module; absence is a recoverable `None`.
    pub fn lookup_native_module(&self, name: &str) -> Option<Arc<dyn NativeModule>> {
        self.registry
            .get(name)
            .or_else(|| self.fallback.read().as_ref().and_then(|r| r.resolve(name)))
    }

    /// Whether the given identifier resolves, through either registry.
    pub fn has_native_module(&self, name: &str) -> bool {
        self.lookup_native_module(name).is_some()
    }

    /// Names of all resolvable modules, classic registry first.
    pub fn native_module_names(&self) -> Vec<String> {
        let mut names = self.registry.names();
        if let Some(fallback) = self.fallback.read().as_ref() {
            names.extend(fallback.module_names());
        }
        names.sort();
        names.dedup();
        names
    }

    /// Merge a registry of new modules into the live one. Colliding
    /// identifiers are rejected and nothing is merged.
    pub fn extend_native_modules(&self, modules: ModuleRegistry) -> Result<(), BridgeError> {
        if self.is_destroyed() {
            return Err(BridgeError::Lifecycle(
                "extend_native_modules on a destroyed bridge".to_string(),
            ));
        }
        self.registry.extend(modules)?;
        Ok(())
    }

    /// Install the fallback resolver consulted when the classic registry
    /// misses. The two stores stay separate; JS sees a unified view.
    pub fn set_fallback_resolver(&self, resolver: Arc<dyn ModuleResolver>) {
        *self.fallback.write() = Some(resolver);
    }

    /// Install extension modules.
    pub fn install_extensions(&self, extensions: Vec<Arc<dyn ExtensionModule>>) {
        self.extensions.install(extensions);
    }

    /// Get the extension module installed under `kind`. A miss on an
    /// initialized bridge is a fatal configuration error.
    pub fn get_extension(&self, kind: ExtensionKind) -> Result<Arc<dyn ExtensionModule>, BridgeError> {
        self.extensions.get(kind)
    }

    // ------------------------------------------------------------------
    // JS interface surface
    // ------------------------------------------------------------------

    /// Proxy for a named JS-side module. Methods called through it are
    /// routed via [`call_function`](Bridge::call_function).
    pub fn get_js_module(&self, name: &str) -> JsModuleHandle {
        JsModuleHandle::new(name.to_string(), self.sink.clone())
    }

    /// Typed facade over a JS module.
    pub fn get_js_interface<T: JsInterface>(&self) -> T {
        T::from_handle(self.get_js_module(T::module_name()))
    }

    // ------------------------------------------------------------------
    // Idle tracking, segments, misc
    // ------------------------------------------------------------------

    /// Register an idle listener. Duplicate adds are no-ops.
    pub fn add_idle_listener(&self, listener: Arc<dyn IdleListener>) {
        self.idle.add_listener(listener);
    }

    /// Remove a previously registered idle listener.
    pub fn remove_idle_listener(&self, listener: &Arc<dyn IdleListener>) {
        self.idle.remove_listener(listener);
    }

    /// Whether no native→JS call is currently unresolved.
    pub fn is_idle(&self) -> bool {
        self.idle.is_idle()
    }

    /// Record the file path of a lazily loadable JS segment and announce it
    /// to the engine. Re-registering an id overwrites the path (last write
    /// wins).
    pub fn register_segment(&self, segment_id: u32, path: impl Into<String>) {
        let path = path.into();
        self.segments.insert(segment_id, path.clone());

        if self.is_destroyed() {
            return;
        }
        let executor = self.executor.clone();
        self.invoker.invoke_on_js(move || {
            if let Err(err) = executor.lock().register_segment(segment_id, &path) {
                tracing::error!(segment_id, %err, "segment registration failed");
            }
        });
    }

    /// Resolve a registered segment path.
    pub fn segment_path(&self, segment_id: u32) -> Option<String> {
        self.segments.get(&segment_id).map(|p| p.clone())
    }

    /// The invoker shared with native-side capability objects.
    pub fn call_invoker(&self) -> CallInvoker {
        self.invoker.clone()
    }

    /// Forward a host memory-pressure signal to every native module, on the
    /// native-modules thread.
    pub fn handle_memory_pressure(&self, level: MemoryPressure) {
        let modules = self.registry.snapshot();
        self.invoker.invoke_on_native(move || {
            for module in &modules {
                module.on_memory_pressure(level);
            }
        });
    }

    // ------------------------------------------------------------------
    // UI root
    // ------------------------------------------------------------------

    /// Start the JS application registered for `root`, assigning a root
    /// view tag on first launch. Fire-and-forget like all native→JS calls.
    pub fn run_application(&self, root: &dyn UiRoot) -> i32 {
        let tag = match root.root_view_tag() {
            Some(tag) => tag,
            None => {
                // Host convention: tags ascend by 10 so surface-local ids fit between
                let tag = self.next_root_tag.fetch_add(10, Ordering::Relaxed);
                root.set_root_view_tag(tag);
                tag
            }
        };

        let mut params = serde_json::json!({ "rootTag": tag });
        if let Some(props) = root.app_properties() {
            params["initialProps"] = props;
        }
        if let Some(template) = root.initial_ui_template() {
            params["initialUITemplate"] = serde_json::Value::String(template);
        }

        self.call_function(
            "AppRegistry",
            "runApplication",
            vec![serde_json::json!(root.js_module_name()), params],
        );
        tag
    }

    /// Forward a root surface stage change to JS.
    pub fn on_stage(&self, root: &dyn UiRoot, stage: Stage) {
        let Some(tag) = root.root_view_tag() else {
            tracing::warn!(
                module = root.js_module_name(),
                "stage change for a root with no view tag; dropped"
            );
            return;
        };
        self.call_function(
            "AppRegistry",
            "setSurfaceStage",
            vec![serde_json::json!(tag), serde_json::json!(stage.as_i32())],
        );
    }

    // ------------------------------------------------------------------

    /// Enqueue a job on the JS thread holding a weak self-reference, so a
    /// queued job never extends the bridge's lifetime.
    fn with_self_on_js<F>(&self, job: F) -> bool
    where
        F: FnOnce(&Bridge) + Send + 'static,
    {
        let weak = self.self_weak.clone();
        self.invoker.invoke_on_js(move || {
            if let Some(bridge) = weak.upgrade() {
                job(&bridge);
            }
        })
    }
}

/// How JS-originated work re-enters the bridge. Holds a weak reference
/// only; an executor keeping this alive never prevents teardown.
struct BridgeDispatcher {
    bridge: Weak<Bridge>,
}

impl NativeCallDispatcher for BridgeDispatcher {
    fn call_native(&self, module: &str, method: &str, args: Args) -> Result<(), BridgeError> {
        let Some(bridge) = self.bridge.upgrade() else {
            return Err(BridgeError::Lifecycle("bridge is gone".to_string()));
        };
        let resolved = bridge.get_native_module(module)?;
        let module = module.to_string();
        let method = method.to_string();
        bridge.invoker.invoke_on_native(move || {
            match resolved.invoke(&method, &args) {
                MethodResult::Unhandled => {
                    tracing::warn!(%module, %method, "native module has no such method");
                }
                MethodResult::Error(err) => {
                    tracing::error!(%module, %method, %err, "native method failed");
                }
                MethodResult::Value(_) | MethodResult::Void => {}
            }
        });
        Ok(())
    }

    fn issue_callback(&self) -> CallbackId {
        match self.bridge.upgrade() {
            Some(bridge) => bridge.callbacks.issue(),
            // Id 0 is never issued; settling it reports Unknown
            None => CallbackId::from_u64(0),
        }
    }

    fn on_batch_complete(&self) {
        if let Some(bridge) = self.bridge.upgrade() {
            bridge.idle.on_batch_complete();
        }
    }

    fn segment_path(&self, segment_id: u32) -> Option<String> {
        self.bridge.upgrade()?.segment_path(segment_id)
    }
}

/// Back-channel handed to native modules at initialization. Weak by
/// design: a module holding its context must never extend the bridge's
/// lifetime.
struct BridgeModuleContext {
    bridge: Weak<Bridge>,
}

impl ModuleContext for BridgeModuleContext {
    fn call_js(&self, module: &str, method: &str, args: Args) -> bool {
        match self.bridge.upgrade() {
            Some(bridge) => bridge.call_function(module, method, args),
            None => false,
        }
    }

    fn settle_callback(&self, callback_id: u64, args: Args) -> bool {
        match self.bridge.upgrade() {
            Some(bridge) => bridge
                .invoke_callback(CallbackId::from_u64(callback_id), args)
                .is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::NoopJsExecutor;

    struct Named(&'static str);

    impl NativeModule for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn invoke(&self, _method: &str, _args: &[serde_json::Value]) -> MethodResult {
            MethodResult::Void
        }
    }

    fn registry_with(names: &[&'static str]) -> ModuleRegistry {
        let registry = ModuleRegistry::new();
        for name in names {
            registry.register(Arc::new(Named(name))).unwrap();
        }
        registry
    }

    fn test_bridge(names: &[&'static str]) -> Arc<Bridge> {
        Bridge::new(Box::new(NoopJsExecutor::new()), registry_with(names))
    }

    #[test]
    fn test_toast_scenario() {
        let bridge = test_bridge(&["Toast"]);

        assert!(bridge.has_native_module("Toast"));
        let first = bridge.get_native_module("Toast").unwrap();
        let second = bridge.get_native_module("Toast").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_missing_module() {
        let bridge = test_bridge(&[]);

        assert!(!bridge.has_native_module("Toast"));
        assert!(bridge.lookup_native_module("Toast").is_none());
        let err = bridge.get_native_module("Toast").unwrap_err();
        assert!(matches!(err, BridgeError::ModuleNotFound(name) if name == "Toast"));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_initialize_is_once_only() {
        let bridge = test_bridge(&[]);

        bridge.initialize().unwrap();
        assert_eq!(bridge.state(), BridgeState::Initialized);
        assert!(matches!(
            bridge.initialize(),
            Err(BridgeError::Lifecycle(_))
        ));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_unknown_callback_is_rejected_but_not_fatal() {
        let bridge = test_bridge(&[]);
        bridge.initialize().unwrap();

        let err = bridge
            .invoke_callback(CallbackId::from_u64(42), vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Callback(crate::callbacks::CallbackError::Unknown(42))
        ));

        // Bridge remains operational
        assert!(bridge.call_function("A", "f", vec![]));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_malformed_global_rejected() {
        let bridge = test_bridge(&[]);
        bridge.initialize().unwrap();

        assert!(matches!(
            bridge.set_global_variable("flags", "{not json"),
            Err(BridgeError::Serialization(_))
        ));
        bridge
            .set_global_variable("flags", r#"{"dev": true}"#)
            .unwrap();

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_segment_registration_last_write_wins() {
        let bridge = test_bridge(&[]);

        bridge.register_segment(7, "/bundles/a.js");
        bridge.register_segment(7, "/bundles/b.js");
        bridge.register_segment(8, "/bundles/c.js");

        assert_eq!(bridge.segment_path(7).as_deref(), Some("/bundles/b.js"));
        assert_eq!(bridge.segment_path(8).as_deref(), Some("/bundles/c.js"));
        assert_eq!(bridge.segment_path(9), None);

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_bundle_lifecycle() {
        let bridge = test_bridge(&[]);

        // Before initialize, loading is a lifecycle violation
        assert!(matches!(
            bridge.run_js_bundle("assets://index.bundle"),
            Err(BridgeError::Lifecycle(_))
        ));
        assert!(!bridge.has_run_js_bundle());
        assert_eq!(bridge.get_source_url(), None);

        bridge.initialize().unwrap();
        bridge.run_js_bundle("assets://index.bundle").unwrap();

        assert!(bridge.has_run_js_bundle());
        assert_eq!(bridge.state(), BridgeState::BundleRunning);
        assert_eq!(
            bridge.get_source_url().as_deref(),
            Some("assets://index.bundle")
        );

        // A bundle runs at most once
        assert!(matches!(
            bridge.run_js_bundle("assets://other.bundle"),
            Err(BridgeError::Lifecycle(_))
        ));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_destroy_is_idempotent_and_final() {
        let bridge = test_bridge(&["Toast"]);
        bridge.initialize().unwrap();

        bridge.destroy().unwrap();
        assert!(bridge.is_destroyed());
        assert_eq!(bridge.state(), BridgeState::Destroyed);

        // Calls after destroy are dropped, not crashed
        assert!(!bridge.call_function("A", "f", vec![]));
        assert!(matches!(
            bridge.get_native_module("Toast"),
            Err(BridgeError::Lifecycle(_))
        ));

        // Second destroy is a no-op
        bridge.destroy().unwrap();
    }

    #[test]
    fn test_destroy_off_ui_thread_rejected() {
        let bridge = test_bridge(&["Toast"]);

        let other = {
            let bridge = bridge.clone();
            thread::spawn(move || bridge.destroy())
        };
        let result = other.join().unwrap();
        assert!(matches!(result, Err(BridgeError::Lifecycle(_))));

        // State unchanged
        assert!(!bridge.is_destroyed());
        assert!(bridge.has_native_module("Toast"));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_extend_native_modules() {
        let bridge = test_bridge(&["Toast"]);

        bridge
            .extend_native_modules(registry_with(&["Clipboard"]))
            .unwrap();
        assert!(bridge.has_native_module("Clipboard"));

        let err = bridge
            .extend_native_modules(registry_with(&["Toast"]))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Registry(_)));
        assert_eq!(
            bridge.native_module_names(),
            vec!["Clipboard".to_string(), "Toast".to_string()]
        );

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_fallback_resolver_consulted_on_miss() {
        struct SecondRegistry;

        impl ModuleResolver for SecondRegistry {
            fn resolve(&self, name: &str) -> Option<Arc<dyn NativeModule>> {
                (name == "TurboToast").then(|| Arc::new(Named("TurboToast")) as _)
            }

            fn module_names(&self) -> Vec<String> {
                vec!["TurboToast".to_string()]
            }
        }

        let bridge = test_bridge(&["Toast"]);
        bridge.set_fallback_resolver(Arc::new(SecondRegistry));

        // Classic registry wins when it has the name
        assert!(bridge.has_native_module("Toast"));
        // Fallback satisfies the miss
        assert!(bridge.has_native_module("TurboToast"));
        assert!(bridge.get_native_module("TurboToast").is_ok());
        assert!(!bridge.has_native_module("Vibration"));
        assert_eq!(
            bridge.native_module_names(),
            vec!["Toast".to_string(), "TurboToast".to_string()]
        );

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_extensions() {
        struct FakeUi;

        impl ExtensionModule for FakeUi {
            fn kind(&self) -> ExtensionKind {
                ExtensionKind::UiManager
            }
        }

        let bridge = test_bridge(&[]);

        assert!(matches!(
            bridge.get_extension(ExtensionKind::UiManager),
            Err(BridgeError::Configuration(ExtensionKind::UiManager))
        ));

        bridge.install_extensions(vec![Arc::new(FakeUi)]);
        assert!(bridge.get_extension(ExtensionKind::UiManager).is_ok());
        assert!(matches!(
            bridge.get_extension(ExtensionKind::TurboModuleManager),
            Err(BridgeError::Configuration(_))
        ));

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_run_application_assigns_tag_once() {
        struct TestRoot {
            tag: Mutex<Option<i32>>,
        }

        impl UiRoot for TestRoot {
            fn js_module_name(&self) -> &str {
                "DemoApp"
            }

            fn app_properties(&self) -> Option<serde_json::Value> {
                Some(serde_json::json!({ "user": "ada" }))
            }

            fn root_view_tag(&self) -> Option<i32> {
                *self.tag.lock()
            }

            fn set_root_view_tag(&self, tag: i32) {
                let mut slot = self.tag.lock();
                assert!(slot.is_none(), "root view tag assigned twice");
                *slot = Some(tag);
            }
        }

        let bridge = test_bridge(&[]);
        bridge.initialize().unwrap();

        let root = TestRoot {
            tag: Mutex::new(None),
        };
        let tag = bridge.run_application(&root);
        assert_eq!(root.root_view_tag(), Some(tag));

        // Relaunch reuses the assigned tag
        assert_eq!(bridge.run_application(&root), tag);

        bridge.on_stage(&root, Stage::Resumed);

        bridge.destroy().unwrap();
    }

    #[test]
    fn test_js_module_handle_survives_destroy() {
        let bridge = test_bridge(&[]);
        bridge.initialize().unwrap();

        let timers = bridge.get_js_module("Timers");
        assert_eq!(timers.module_name(), "Timers");
        assert!(timers.call("createTimer", vec![serde_json::json!(1)]));

        bridge.destroy().unwrap();
        assert!(!timers.call("createTimer", vec![serde_json::json!(2)]));
    }
}
