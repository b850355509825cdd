//! Per-request context threaded through every storage call.
//!
//! A [`Context`] carries three things explicitly instead of relying on
//! task-local or global state:
//!
//! - a [`CancellationToken`] the caller can trigger to abort the call
//! - an optional deadline after which the call is abandoned
//! - the ambient Postgres transaction, attached by
//!   [`TxManager`](crate::infrastructure::transaction::TxManager)
//!
//! Repositories run their store I/O through [`Context::run`], so a cancelled
//! or expired context yields [`NoteError::Cancelled`] and never partial data.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{NoteError, NoteResult};
use crate::infrastructure::transaction::TxHandle;

/// Request-scoped cancellation, deadline and transaction state.
///
/// Cloning is cheap; clones share the same cancellation token and transaction.
#[derive(Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    tx: Option<TxHandle>,
}

impl Context {
    /// Creates a context with no deadline and no transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            ..Self::default()
        }
    }

    /// Creates a context driven by an externally owned cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..Self::default()
        }
    }

    /// Returns the token that cancels this context.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the context is cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true if a transaction is attached to this context.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    pub(crate) fn transaction(&self) -> Option<&TxHandle> {
        self.tx.as_ref()
    }

    /// Derives a context that shares cancellation and deadline but carries `tx`.
    pub(crate) fn with_transaction(&self, tx: TxHandle) -> Self {
        Self {
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            tx: Some(tx),
        }
    }

    /// Drives `fut` to completion unless the context is cancelled or expires first.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Cancelled`] if cancellation wins the race, otherwise
    /// whatever `fut` resolves to.
    pub async fn run<T, F>(&self, fut: F) -> NoteResult<T>
    where
        F: Future<Output = NoteResult<T>>,
    {
        if self.is_cancelled() {
            return Err(NoteError::Cancelled);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(NoteError::Cancelled),
            _ = expired => Err(NoteError::Cancelled),
            result = fut => result,
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("deadline", &self.deadline)
            .field("in_transaction", &self.tx.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_returns_future_output() {
        let ctx = Context::new();

        let result = ctx.run(async { Ok::<_, NoteError>(42) }).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_run_on_cancelled_context_skips_future() {
        let ctx = Context::new();
        ctx.cancel();

        let result = ctx.run(async { Ok::<_, NoteError>(()) }).await;

        assert!(matches!(result, Err(NoteError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_while_pending() {
        let token = CancellationToken::new();
        let ctx = Context::with_cancellation(token.clone());

        let handle = tokio::spawn(async move {
            ctx.run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, NoteError>(())
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(NoteError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let ctx = Context::with_timeout(Duration::from_millis(20));

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, NoteError>(())
            })
            .await;

        assert!(matches!(result, Err(NoteError::Cancelled)));
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_new_context_has_no_transaction() {
        let ctx = Context::new();

        assert!(!ctx.in_transaction());
        assert!(!ctx.is_cancelled());
        assert!(ctx.deadline().is_none());
    }
}
