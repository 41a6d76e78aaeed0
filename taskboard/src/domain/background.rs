//! Guard for listener tasks spawned by the stores.

use tokio::task::JoinHandle;

/// Owns a spawned listener and aborts it when dropped.
///
/// Dropping the guard is the unsubscribe: a listener can never outlive the
/// object that registered it.
#[derive(Debug)]
#[must_use = "dropping the guard stops the listener immediately"]
pub struct ListenerGuard {
    handle: Option<JoinHandle<()>>,
}

impl ListenerGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the listener now.
    pub fn unsubscribe(mut self) {
        self.abort();
    }

    /// Whether the listener task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.abort();
    }
}
