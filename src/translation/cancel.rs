/*!
 * Cooperative cancellation.
 *
 * A cloneable token wrapping a shared flag. The pipeline and the translation
 * client check it at every suspension point; an in-flight request is never
 * aborted, only the next step is skipped.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;

/// Shared stop signal passed down the translation call chain
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel automatically once `timeout` has elapsed
    ///
    /// Must be called from within a tokio runtime. The returned handle can be
    /// aborted to disarm the timer.
    pub fn cancel_after(&self, timeout: Duration) -> tokio::task::JoinHandle<()> {
        let token = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            debug!("Cancelling translation after {:?}", timeout);
            token.cancel();
        })
    }

    /// Sleep for `duration` and report whether the token fired meanwhile
    pub async fn sleep(&self, duration: Duration) -> bool {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
        self.is_cancelled()
    }
}
