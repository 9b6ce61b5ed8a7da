//! JS call sink — the one path native→JS work travels
//!
//! Shared by the bridge and every [`JsModuleHandle`] it hands out. The sink
//! increments the idle tracker at dispatch time, enqueues the executor call
//! onto the JS thread, and goes quiet once the bridge is destroyed: calls
//! are dropped with a log line, never a panic.
//!
//! [`JsModuleHandle`]: crate::proxy::JsModuleHandle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use trestle_sdk::Args;

use crate::callbacks::CallbackId;
use crate::executor::JsExecutor;
use crate::idle::IdleTracker;
use crate::queue::QueueHandle;

pub(crate) struct JsCallSink {
    js: QueueHandle,
    executor: Arc<Mutex<Box<dyn JsExecutor>>>,
    idle: Arc<IdleTracker>,
    destroyed: Arc<AtomicBool>,
}

impl JsCallSink {
    pub(crate) fn new(
        js: QueueHandle,
        executor: Arc<Mutex<Box<dyn JsExecutor>>>,
        idle: Arc<IdleTracker>,
        destroyed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            js,
            executor,
            idle,
            destroyed,
        }
    }

    /// Enqueue a JS module method invocation. Returns `false` if the call
    /// was dropped because the bridge is destroyed or its JS queue is gone.
    pub(crate) fn call_function(&self, module: &str, method: &str, args: Args) -> bool {
        if self.destroyed.load(Ordering::Acquire) {
            tracing::warn!(module, method, "dropping JS call: bridge destroyed");
            return false;
        }

        self.idle.on_dispatch();

        let executor = self.executor.clone();
        let module = module.to_string();
        let method = method.to_string();
        let enqueued = self.js.run(move || {
            if let Err(err) = executor.lock().call_function(&module, &method, &args) {
                tracing::error!(%module, %method, %err, "JS call failed");
            }
        });

        if !enqueued {
            // The queue shut down between the destroyed check and the send;
            // the call is dropped, so the dispatch is no longer in flight.
            self.idle.on_batch_complete();
        }
        enqueued
    }

    /// Enqueue a JS callback resolution. The id must already be settled in
    /// the callback registry.
    pub(crate) fn invoke_callback(&self, id: CallbackId, args: Args) -> bool {
        if self.destroyed.load(Ordering::Acquire) {
            tracing::warn!(id = id.as_u64(), "dropping callback resolution: bridge destroyed");
            return false;
        }

        self.idle.on_dispatch();

        let executor = self.executor.clone();
        let enqueued = self.js.run(move || {
            if let Err(err) = executor.lock().invoke_callback(id, &args) {
                tracing::error!(id = id.as_u64(), %err, "JS callback resolution failed");
            }
        });

        if !enqueued {
            self.idle.on_batch_complete();
        }
        enqueued
    }
}
