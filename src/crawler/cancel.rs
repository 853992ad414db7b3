//! Cooperative cancellation
//!
//! A `CancelToken` is cloned into every branch and page task. Delays and
//! fetches race against it, so an expired deadline or Ctrl-C stops in-flight
//! work at the next await point instead of waiting for it to finish.

use crate::TrailError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shared cancellation flag
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Cancels every clone of this token
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns true once `cancel` has been called on any clone
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes when the token is cancelled
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        while !*receiver.borrow_and_update() {
            if receiver.changed().await.is_err() {
                // Every sender is gone, so the flag can never flip.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `future` unless the token is cancelled first
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, TrailError> {
        if self.is_cancelled() {
            return Err(TrailError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(TrailError::Cancelled),
            output = future => Ok(output),
        }
    }

    /// Cancels the token once `deadline` has elapsed
    pub fn cancel_after(&self, deadline: Duration) -> JoinHandle<()> {
        let token = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            tracing::warn!("Deadline of {:?} reached, cancelling traversal", deadline);
            token.cancel();
        })
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
