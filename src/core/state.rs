//! Process-wide run state.
//!
//! `SHUTDOWN` is set once by the Ctrl+C handler. Blocking loops poll
//! [`is_shutdown`]; async sessions await [`shutdown_requested`].

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Wakes sessions parked on the event channel
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// Setup the global Ctrl+C handler. Call once at program start
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        crate::log!("livepatch"; "shutting down...");
        request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Flag shutdown and wake every waiter
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    SHUTDOWN_NOTIFY.notify_waiters();
}

/// Check if shutdown has been requested
///
/// Uses Relaxed ordering - worst case is one more poll before stopping
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Resolves once shutdown has been requested.
pub async fn shutdown_requested() {
    let notified = SHUTDOWN_NOTIFY.notified();
    tokio::pin!(notified);
    // Register before checking the flag so a request in between is not lost
    notified.as_mut().enable();
    if SHUTDOWN.load(Ordering::SeqCst) {
        return;
    }
    notified.await;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_not_requested_stays_pending() {
        // Nothing in the test suite requests shutdown
        let waited = tokio::time::timeout(Duration::from_millis(20), shutdown_requested()).await;
        assert!(waited.is_err());
        assert!(!is_shutdown());
    }
}
