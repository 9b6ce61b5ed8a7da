//! Call invoker — marshals closures onto the bridge's execution threads
//!
//! A `CallInvoker` is the cheap-to-clone handle shared with native-side
//! capability objects so they can call back across the bridge. It enqueues
//! only; nothing ever runs synchronously on the caller's thread.

use crate::queue::QueueHandle;

/// Marshals native-originated work onto the JS thread and JS-originated
/// work onto the native-modules thread.
///
/// Cloning is cheap; clones share the underlying queues. Once the bridge is
/// destroyed and its queues joined, both invoke methods report `false` and
/// drop the closure.
#[derive(Clone)]
pub struct CallInvoker {
    js: QueueHandle,
    native: QueueHandle,
}

impl CallInvoker {
    pub(crate) fn new(js: QueueHandle, native: QueueHandle) -> Self {
        Self { js, native }
    }

    /// Enqueue a closure onto the JS execution thread.
    pub fn invoke_on_js<F>(&self, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.js.run(f)
    }

    /// Enqueue a closure onto the native-modules thread.
    pub fn invoke_on_native<F>(&self, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.native.run(f)
    }

    /// Check whether the calling thread is the JS execution thread.
    pub fn is_on_js_thread(&self) -> bool {
        self.js.is_on_thread()
    }

    /// Check whether the calling thread is the native-modules thread.
    pub fn is_on_native_thread(&self) -> bool {
        self.native.is_on_thread()
    }
}

impl std::fmt::Debug for CallInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallInvoker")
            .field("js", &self.js.name())
            .field("native", &self.native.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueConfig;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_invoker_routes_to_each_thread() {
        let mut config = QueueConfig::new();
        let invoker = CallInvoker::new(config.js_handle(), config.native_handle());
        let (tx, rx) = mpsc::channel();

        {
            let invoker = invoker.clone();
            let tx = tx.clone();
            invoker.clone().invoke_on_js(move || {
                tx.send(invoker.is_on_js_thread()).unwrap();
            });
        }
        {
            let invoker = invoker.clone();
            let tx = tx.clone();
            invoker.clone().invoke_on_native(move || {
                tx.send(invoker.is_on_native_thread()).unwrap();
            });
        }

        assert!(rx.recv_timeout(Duration::from_secs(1)).unwrap());
        assert!(rx.recv_timeout(Duration::from_secs(1)).unwrap());

        config.destroy();
        assert!(!invoker.invoke_on_js(|| {}));
        assert!(!invoker.invoke_on_native(|| {}));
    }
}
