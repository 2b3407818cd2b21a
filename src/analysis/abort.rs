//! Cooperative cancellation

use std::sync::Arc;
use tokio::sync::watch;

/// Shared abort flag for one analysis run
///
/// Long-running steps poll [`AbortSignal::is_aborted`] between chunks;
/// the controller can also await [`AbortSignal::aborted`].
#[derive(Debug, Clone)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once cancellation has been requested
    pub async fn aborted(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once set
        let _ = rx.wait_for(|aborted| *aborted).await;
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
