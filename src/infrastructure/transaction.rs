//! Transaction manager for multi-step units of work.
//!
//! [`TxManager`] runs a caller-supplied closure as one atomic step when the
//! active backend supports transactions (PostgreSQL) and degrades to a direct
//! call when it does not (Redis, in-memory).
//!
//! # Exit paths
//!
//! | closure outcome            | action          | returned                         |
//! |----------------------------|-----------------|----------------------------------|
//! | `Ok(v)`                    | `COMMIT`        | `Ok(v)`                          |
//! | `Ok(v)`, context cancelled | `ROLLBACK`      | [`NoteError::Cancelled`]         |
//! | `Err(Cancelled)`           | `ROLLBACK`      | [`NoteError::Cancelled`]         |
//! | `Err(e)`                   | `ROLLBACK`      | [`NoteError::TransactionFailed`] |
//! | panic                      | `ROLLBACK`      | panic is resumed                 |
//! | future dropped             | sqlx drop guard | -                                |
//!
//! A failing `COMMIT` or `ROLLBACK` is reported as [`NoteError::StoreUnavailable`].

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::context::Context;
use crate::error::{NoteError, NoteResult};

pub(crate) type PgTransaction = Transaction<'static, Postgres>;

/// Shared handle to the transaction attached to a [`Context`].
///
/// Only [`TxManager`] creates handles, and it takes the transaction back out
/// to commit or roll back before returning to its caller.
#[derive(Clone)]
pub struct TxHandle(Arc<Mutex<Option<PgTransaction>>>);

impl TxHandle {
    fn new(tx: PgTransaction) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    /// Locks the transaction for the duration of one statement.
    ///
    /// The guard holds `None` once the transaction has been finished.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<PgTransaction>> {
        self.0.lock().await
    }

    async fn take(&self) -> Option<PgTransaction> {
        self.0.lock().await.take()
    }
}

/// Runs units of work atomically against the active backend.
#[derive(Clone)]
pub enum TxManager {
    /// Wraps each unit of work in a PostgreSQL transaction.
    Postgres(Arc<PgPool>),
    /// Invokes the unit of work directly; multi-step work is best-effort only.
    Passthrough,
}

impl TxManager {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self::Postgres(pool)
    }

    pub fn passthrough() -> Self {
        Self::Passthrough
    }

    /// Returns true if units of work get real all-or-nothing semantics.
    pub fn is_transactional(&self) -> bool {
        matches!(self, Self::Postgres(_))
    }

    /// Executes `work` with a context carrying a transaction handle.
    ///
    /// If `ctx` already carries a transaction, `work` joins it instead of
    /// starting a new one.
    ///
    /// # Errors
    ///
    /// See the module-level table. In passthrough mode and when joining an
    /// outer transaction, errors from `work` are returned unchanged.
    pub async fn run_in_transaction<T, F, Fut>(&self, ctx: &Context, work: F) -> NoteResult<T>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = NoteResult<T>>,
    {
        let pool = match self {
            Self::Passthrough => return work(ctx.clone()).await,
            Self::Postgres(pool) => pool,
        };

        if ctx.in_transaction() {
            return work(ctx.clone()).await;
        }

        let tx = ctx
            .run(async { pool.begin().await.map_err(NoteError::from) })
            .await?;
        debug!("Transaction started");

        let handle = TxHandle::new(tx);
        let outcome = AssertUnwindSafe(work(ctx.with_transaction(handle.clone())))
            .catch_unwind()
            .await;
        let tx = handle.take().await;

        match outcome {
            Err(panic) => {
                if let Some(tx) = tx {
                    let _ = tx.rollback().await;
                }
                debug!("Transaction rolled back after panic");
                std::panic::resume_unwind(panic)
            }
            Ok(Err(err)) => {
                rollback(tx).await?;
                debug!("Transaction rolled back: {}", err);
                Err(match err {
                    NoteError::Cancelled => NoteError::Cancelled,
                    err @ NoteError::TransactionFailed(_) => err,
                    other => NoteError::TransactionFailed(Box::new(other)),
                })
            }
            Ok(Ok(value)) => {
                if ctx.is_cancelled() {
                    rollback(tx).await?;
                    debug!("Transaction rolled back: context cancelled");
                    return Err(NoteError::Cancelled);
                }

                let tx = tx.ok_or_else(|| {
                    NoteError::unavailable("transaction was released before commit")
                })?;
                tx.commit()
                    .await
                    .map_err(|e| NoteError::unavailable(format!("commit failed: {e}")))?;
                debug!("Transaction committed");
                Ok(value)
            }
        }
    }
}

async fn rollback(tx: Option<PgTransaction>) -> NoteResult<()> {
    match tx {
        Some(tx) => tx
            .rollback()
            .await
            .map_err(|e| NoteError::unavailable(format!("rollback failed: {e}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_runs_work_with_original_context() {
        let manager = TxManager::passthrough();
        let ctx = Context::new();

        let result = manager
            .run_in_transaction(&ctx, |tx_ctx| async move {
                assert!(!tx_ctx.in_transaction());
                Ok(5)
            })
            .await;

        assert_eq!(result.unwrap(), 5);
        assert!(!manager.is_transactional());
    }

    #[tokio::test]
    async fn test_passthrough_propagates_errors_unchanged() {
        let manager = TxManager::passthrough();

        let result: NoteResult<()> = manager
            .run_in_transaction(&Context::new(), |_| async {
                Err(NoteError::not_found(9))
            })
            .await;

        assert!(matches!(result, Err(NoteError::NotFound { id: 9 })));
    }
}
