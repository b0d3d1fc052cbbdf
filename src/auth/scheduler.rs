//! Single-slot timer that fires a refresh shortly before the access token
//! expires.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::token::decode_expiry;

/// How long before expiry the refresh fires.
pub const LEAD_SECONDS: i64 = 300;

/// Delay until a token expiring at `exp` should be refreshed, given the
/// current time `now` (both seconds since the epoch). Clamped at zero.
pub fn refresh_delay(exp: i64, now: i64) -> Duration {
    let secs = exp.saturating_sub(now).saturating_sub(LEAD_SECONDS).max(0);
    Duration::from_secs(secs as u64)
}

struct Pending {
    id: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Holds at most one pending refresh callback.
///
/// Scheduling replaces (and aborts) whatever was pending. A callback that
/// fires removes itself from the slot first, so it may schedule the next
/// refresh without aborting itself.
#[derive(Default)]
pub struct RefreshScheduler {
    slot: Arc<Mutex<Option<Pending>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for `on_due` to run [`LEAD_SECONDS`] before `access_token`
    /// expires, cancelling any previously scheduled callback.
    ///
    /// Returns `false` (and schedules nothing) when the expiry cannot be
    /// decoded or no tokio runtime is available. A token that is already
    /// inside the lead window still fires on a spawned task, never inline.
    pub fn schedule_refresh<F, Fut>(&self, access_token: &str, on_due: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock_slot();
        if let Some(previous) = slot.take() {
            previous.handle.abort();
        }

        let Some(exp) = decode_expiry(access_token) else {
            debug!("Access token expiry not decodable; refresh not scheduled");
            return false;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; refresh not scheduled");
            return false;
        };

        let delay = refresh_delay(exp, Utc::now().timestamp());
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::clone(&self.slot);
        debug!(exp, delay_secs = delay.as_secs(), "Scheduling token refresh");

        // The slot stays locked until the handle is stored, so the task can
        // never detach before it has been registered.
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut guard = shared.lock().unwrap_or_else(|e| e.into_inner());
                if guard.as_ref().map(|p| p.id) == Some(id) {
                    guard.take();
                }
            }
            on_due().await;
        });
        *slot = Some(Pending {
            id,
            deadline: Instant::now() + delay,
            handle,
        });
        true
    }

    /// Abort the pending callback, if any. Idempotent.
    pub fn cancel(&self) {
        if let Some(pending) = self.lock_slot().take() {
            pending.handle.abort();
            debug!("Scheduled token refresh cancelled");
        }
    }

    /// Whether a callback is waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// When the pending callback is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.lock_slot().as_ref().map(|p| p.deadline)
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Pending>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
