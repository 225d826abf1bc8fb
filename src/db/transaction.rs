//! Transaction coordinator.
//!
//! Runs a unit of work inside a fresh transaction on the current pool, or
//! hands it a caller-supplied executor so nested calls join the outer
//! transaction. The transaction is released exactly once: committed on
//! success, rolled back on failure, and rolled back from `Drop` when the call
//! is abandoned part way.

use crate::db::backend::{AccessMode, Backend, Querier, TxHandle};
use crate::db::pool::ConnectionManager;
use crate::error::{DbError, DbResult, TxPhase};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs units of work inside transactions on the manager's pool.
pub struct TransactionCoordinator<B: Backend, Q> {
    manager: Arc<ConnectionManager<B>>,
    _querier: PhantomData<fn() -> Q>,
}

impl<B, Q> TransactionCoordinator<B, Q>
where
    B: Backend,
    Q: Querier<Backend = B>,
{
    pub fn new(manager: Arc<ConnectionManager<B>>) -> Self {
        Self {
            manager,
            _querier: PhantomData,
        }
    }

    /// Run `work` in a read-only transaction.
    pub async fn run_read_only<T, F, Fut>(&self, work: F, existing: Option<&Q>) -> DbResult<T>
    where
        F: FnOnce(Q) -> Fut + Send,
        Fut: Future<Output = DbResult<T>> + Send,
        T: Send,
    {
        self.run(AccessMode::ReadOnly, work, existing).await
    }

    /// Run `work` in a read-write transaction.
    pub async fn run_read_write<T, F, Fut>(&self, work: F, existing: Option<&Q>) -> DbResult<T>
    where
        F: FnOnce(Q) -> Fut + Send,
        Fut: Future<Output = DbResult<T>> + Send,
        T: Send,
    {
        self.run(AccessMode::ReadWrite, work, existing).await
    }

    /// Run `work` with the given access mode.
    ///
    /// With an existing executor the work unit runs on it directly and its
    /// result is returned untouched; no transaction is opened.
    pub async fn run<T, F, Fut>(&self, mode: AccessMode, work: F, existing: Option<&Q>) -> DbResult<T>
    where
        F: FnOnce(Q) -> Fut + Send,
        Fut: Future<Output = DbResult<T>> + Send,
        T: Send,
    {
        if let Some(querier) = existing {
            return work(querier.clone()).await;
        }

        let pool = self
            .manager
            .pool()
            .await
            .map_err(|e| DbError::transaction(TxPhase::Begin, e))?;

        let tx = self
            .manager
            .backend()
            .begin(&pool, mode)
            .await
            .map_err(|e| DbError::transaction(TxPhase::Begin, e))?;

        let handle = TxHandle::<B>::new(tx);
        let mut guard = TxGuard::new(Arc::clone(&self.manager), handle.clone(), mode);
        let querier = Q::new(pool).with_tx(handle);
        debug!(mode = %mode, "Transaction started");

        match work(querier).await {
            Ok(value) => {
                guard
                    .commit()
                    .await
                    .map_err(|e| DbError::transaction(TxPhase::Commit, e))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = guard.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed work unit failed");
                }
                Err(DbError::work_unit(e))
            }
        }
    }
}

impl<B: Backend, Q> Clone for TransactionCoordinator<B, Q> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            _querier: PhantomData,
        }
    }
}

/// Releases a transaction exactly once.
///
/// If neither [`commit`](Self::commit) nor [`rollback`](Self::rollback) ran,
/// `Drop` spawns a rollback on the current runtime.
struct TxGuard<B: Backend> {
    manager: Arc<ConnectionManager<B>>,
    handle: TxHandle<B>,
    mode: AccessMode,
    finished: bool,
}

impl<B: Backend> TxGuard<B> {
    fn new(manager: Arc<ConnectionManager<B>>, handle: TxHandle<B>, mode: AccessMode) -> Self {
        Self {
            manager,
            handle,
            mode,
            finished: false,
        }
    }

    async fn commit(&mut self) -> DbResult<()> {
        self.finished = true;
        let tx = self.handle.take().await.ok_or_else(inactive)?;
        self.manager.backend().commit(tx).await?;
        debug!(mode = %self.mode, "Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.finished = true;
        let tx = self.handle.take().await.ok_or_else(inactive)?;
        self.manager.backend().rollback(tx).await?;
        debug!(mode = %self.mode, "Transaction rolled back");
        Ok(())
    }
}

impl<B: Backend> Drop for TxGuard<B> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available, transaction left to the driver to discard");
            return;
        };

        let manager = Arc::clone(&self.manager);
        let handle = self.handle.clone();
        let mode = self.mode;

        runtime.spawn(async move {
            if let Some(tx) = handle.take().await {
                if let Err(e) = manager.backend().rollback(tx).await {
                    warn!(error = %e, "Rollback via Drop failed");
                }
            }
            warn!(
                mode = %mode,
                "Transaction rolled back via Drop - work unit did not complete"
            );
        });
    }
}

fn inactive() -> DbError {
    DbError::internal("Transaction is no longer active")
}
