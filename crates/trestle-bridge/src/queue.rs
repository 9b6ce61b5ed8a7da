//! Message queue threads and the static three-context queue configuration
//!
//! Every piece of bridge work runs on one of three logical threads: the
//! UI-affinity thread (the thread that constructed the [`QueueConfig`], not
//! spawned by us), the JS execution thread, and the native-modules thread.
//! Cross-context calls are message passing only: a job is enqueued onto the
//! target thread's channel and executed there, never invoked synchronously.
//! Jobs sent from one thread arrive in send order (per-origin FIFO).

use std::thread::{self, JoinHandle, ThreadId};

use crossbeam::channel::{self, Sender};

/// A unit of work enqueued onto a message queue thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Job(Job),
    Shutdown,
}

/// Cloneable enqueue handle for a [`MessageQueueThread`].
///
/// Handles stay valid after the thread shuts down; enqueueing onto a dead
/// queue reports `false` instead of panicking.
#[derive(Clone)]
pub struct QueueHandle {
    name: &'static str,
    sender: Sender<Message>,
    thread_id: ThreadId,
}

impl QueueHandle {
    /// Enqueue a job. Returns `false` if the queue has shut down, in which
    /// case the job is dropped.
    pub fn run<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Message::Job(Box::new(job))).is_ok()
    }

    /// Check whether the calling thread is this queue's thread.
    pub fn is_on_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Name of the underlying thread.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A named OS thread draining a FIFO channel of jobs.
pub struct MessageQueueThread {
    name: &'static str,
    sender: Sender<Message>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl MessageQueueThread {
    /// Spawn the queue thread.
    pub fn spawn(name: &'static str) -> Self {
        let (sender, receiver) = channel::unbounded::<Message>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // Drain until the shutdown sentinel. Jobs enqueued before the
                // sentinel are executed; jobs after it are dropped when the
                // receiver goes away.
                while let Ok(message) = receiver.recv() {
                    match message {
                        Message::Job(job) => job(),
                        Message::Shutdown => break,
                    }
                }
            })
            .expect("Failed to spawn message queue thread");

        let thread_id = handle.thread().id();

        Self {
            name,
            sender,
            thread_id,
            handle: Some(handle),
        }
    }

    /// Get a cloneable enqueue handle.
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            name: self.name,
            sender: self.sender.clone(),
            thread_id: self.thread_id,
        }
    }

    /// Enqueue a job directly. Returns `false` if the queue has shut down.
    pub fn run<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Message::Job(Box::new(job))).is_ok()
    }

    /// Check whether the calling thread is this queue's thread.
    pub fn is_on_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Drain all pending jobs, stop the thread, and join it. Idempotent.
    pub fn shutdown_and_join(&mut self) {
        // Send may fail if the thread is already gone
        let _ = self.sender.send(Message::Shutdown);

        if let Some(handle) = self.handle.take() {
            handle.join().expect("Failed to join message queue thread");
        }
    }
}

impl Drop for MessageQueueThread {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

impl std::fmt::Debug for MessageQueueThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueueThread")
            .field("name", &self.name)
            .field("joined", &self.handle.is_none())
            .finish()
    }
}

/// Static assignment of bridge work to its three execution contexts.
///
/// The UI thread is captured, not spawned: it is the thread that constructed
/// this config, the same thread that owns view operations in the host. The
/// JS and native-modules threads are spawned here and joined by
/// [`QueueConfig::destroy`]. The assignment never changes over the config's
/// lifetime.
pub struct QueueConfig {
    ui_thread: ThreadId,
    js: MessageQueueThread,
    native: MessageQueueThread,
}

impl QueueConfig {
    /// Create the queue configuration, capturing the calling thread as the
    /// UI-affinity thread.
    pub fn new() -> Self {
        Self {
            ui_thread: thread::current().id(),
            js: MessageQueueThread::spawn("trestle-js"),
            native: MessageQueueThread::spawn("trestle-native-modules"),
        }
    }

    /// Check whether the calling thread is the UI-affinity thread.
    pub fn is_on_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Enqueue handle for the JS execution thread.
    pub fn js_handle(&self) -> QueueHandle {
        self.js.handle()
    }

    /// Enqueue handle for the native-modules thread.
    pub fn native_handle(&self) -> QueueHandle {
        self.native.handle()
    }

    /// Drain and join both spawned threads. After this returns no bridge
    /// background work remains runnable.
    pub fn destroy(&mut self) {
        self.js.shutdown_and_join();
        self.native.shutdown_and_join();
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new()
    }
}
