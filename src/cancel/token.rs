//! Write-once cancellation flag with an optional deadline timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::debug;

/// Cancellation token: set at most once, readable from anywhere.
///
/// Clones share the same flag, so a timer task, an external caller, and the
/// traversal loop can all hold handles to the same run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every pending `cancelled()` wait. Idempotent.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Non-blocking check, safe to call repeatedly from the traversal loop.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token has been cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register interest before re-checking so a concurrent cancel()
            // cannot slip between the check and the wait.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Arms a one-shot timer that cancels this token after `duration`.
    pub fn expire_after(&self, duration: Duration) {
        let token = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            debug!("deadline reached after {:?}", duration);
            token.cancel();
        });
    }
}
