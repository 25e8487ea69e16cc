//! Caller-initiated cancellation of an in-flight invocation

use std::sync::Arc;
use tokio::sync::watch;

/// Create a connected handle/token pair
///
/// The handle stays with the caller; the token is passed to
/// [`Invoker::invoke`](crate::Invoker::invoke).
///
/// # Examples
///
/// ```
/// let (handle, token) = prism_runner::cancel_pair();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelToken { rx })
}

/// Caller side: requests cancellation
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Invocation side: observes cancellation
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_handle, token) = cancel_pair();
        token
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested
    ///
    /// If every handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}
