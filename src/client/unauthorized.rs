use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Callback run when a request comes back 401.
pub type UnauthorizedCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned when registering a listener; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    /// Survives [`UnauthorizedListeners::replace_all`].
    pinned: bool,
    callback: UnauthorizedCallback,
}

/// Observers notified, in registration order, on every 401.
#[derive(Default)]
pub(crate) struct UnauthorizedListeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl UnauthorizedListeners {
    pub(crate) fn add(&self, callback: UnauthorizedCallback) -> ListenerId {
        self.push(callback, false)
    }

    /// Register a listener that only [`Self::remove`] can drop.
    pub(crate) fn add_pinned(&self, callback: UnauthorizedCallback) -> ListenerId {
        self.push(callback, true)
    }

    fn push(&self, callback: UnauthorizedCallback, pinned: bool) -> ListenerId {
        let id = self.next_id();
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Entry {
                id,
                pinned,
                callback,
            });
        }
        id
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Drop every unpinned listener and register `callback` in their place.
    pub(crate) fn replace_all(&self, callback: UnauthorizedCallback) -> ListenerId {
        let id = self.next_id();
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|entry| entry.pinned);
            entries.push(Entry {
                id,
                pinned: false,
                callback,
            });
        }
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Run every listener once. The lock is released before callbacks run so
    /// a listener may register or remove listeners.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<UnauthorizedCallback> = match self.entries.lock() {
            Ok(entries) => entries.iter().map(|entry| entry.callback.clone()).collect(),
            Err(_) => return,
        };
        for callback in snapshot {
            callback();
        }
    }
}
