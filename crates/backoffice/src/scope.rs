//! View lifetime and cancellation of in-flight remote calls.
//!
//! Each form owns a [`ViewScope`]. Every remote call the form issues runs
//! through [`ViewScope::run`]; once the scope is closed, pending and future
//! calls resolve to [`AppError::Cancelled`] and the form state is not touched.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{AppError, AppResult};

/// Lifetime of one open view.
///
/// Clones share the same lifetime, so the UI shell can keep a clone and close
/// the view while a form operation is awaiting the network.
#[derive(Debug, Clone)]
pub struct ViewScope {
    closed: Arc<watch::Sender<bool>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    /// A new, open scope.
    #[must_use]
    pub fn new() -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            closed: Arc::new(closed),
        }
    }

    /// Close the scope. Idempotent.
    pub fn close(&self) {
        if !self.closed.send_replace(true) {
            tracing::debug!("View scope closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Run `call` unless the scope closes first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the scope is already closed or closes
    /// before `call` completes; `call` is dropped in that case.
    pub async fn run<F>(&self, call: F) -> AppResult<F::Output>
    where
        F: Future,
    {
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return Err(AppError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => Err(AppError::Cancelled),
            output = call => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_run_completes_while_open() {
        let scope = ViewScope::new();
        let value = scope.run(async { 7 }).await;
        assert!(matches!(value, Ok(7)));
    }

    #[tokio::test]
    async fn test_run_after_close_is_cancelled() {
        let scope = ViewScope::new();
        scope.close();
        scope.close();
        assert!(scope.is_closed());
        assert!(matches!(scope.run(async { 7 }).await, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_close_cancels_pending_call() {
        let scope = ViewScope::new();
        let closer = scope.clone();

        let pending = scope.run(tokio::time::sleep(Duration::from_secs(3600)));
        let close = async {
            tokio::task::yield_now().await;
            closer.close();
        };

        let (result, ()) = tokio::join!(pending, close);
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
