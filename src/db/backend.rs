//! Driver seam for the data layer.
//!
//! The connection manager and transaction coordinator never talk to a database
//! driver directly. They go through [`Backend`], which covers the handful of
//! operations they need: connect (including migrations), ping, close, and the
//! begin/commit/rollback triple. Query executors plug in through [`Querier`].

use crate::config::PoolOptions;
use crate::error::{DbError, DbResult};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

/// Access mode requested for a new transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    /// Check whether writes are permitted in this mode.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Database driver operations used by the connection manager and coordinator.
///
/// `connect` must leave the schema fully migrated before returning.
pub trait Backend: Send + Sync + 'static {
    /// Shared, internally synchronised pool handle. Cloning must be cheap.
    type Pool: Clone + Send + Sync + 'static;
    /// An open transaction owned by exactly one unit of work.
    type Tx: Send + 'static;

    /// Parse the endpoint, build a pool and run migrations against it.
    fn connect(
        &self,
        url: &str,
        options: &PoolOptions,
    ) -> impl Future<Output = DbResult<Self::Pool>> + Send;

    /// Liveness probe against the pool.
    fn ping(&self, pool: &Self::Pool) -> impl Future<Output = DbResult<()>> + Send;

    /// Close the pool. Must be idempotent.
    fn close(&self, pool: &Self::Pool) -> impl Future<Output = ()> + Send;

    /// Begin a transaction with the given access mode.
    fn begin(
        &self,
        pool: &Self::Pool,
        mode: AccessMode,
    ) -> impl Future<Output = DbResult<Self::Tx>> + Send;

    fn commit(&self, tx: Self::Tx) -> impl Future<Output = DbResult<()>> + Send;

    fn rollback(&self, tx: Self::Tx) -> impl Future<Output = DbResult<()>> + Send;
}

/// Query executor bound either to a pool or to an open transaction.
///
/// Work units receive an owned executor; nested calls pass it back to the
/// coordinator as the existing executor to join the same transaction.
pub trait Querier: Clone + Send + Sync + 'static {
    type Backend: Backend;

    /// Executor that runs each statement on its own pooled connection.
    fn new(pool: <Self::Backend as Backend>::Pool) -> Self;

    /// Same capability set, rebound to the given transaction.
    fn with_tx(&self, tx: TxHandle<Self::Backend>) -> Self;
}

/// Shared slot holding an open transaction.
///
/// The coordinator takes the transaction out when committing or rolling back;
/// executors still holding a clone afterwards get an error instead of a
/// connection.
pub struct TxHandle<B: Backend> {
    slot: Arc<Mutex<Option<B::Tx>>>,
}

impl<B: Backend> TxHandle<B> {
    pub fn new(tx: B::Tx) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Lock the transaction for the duration of one statement.
    pub async fn lock(&self) -> DbResult<MappedMutexGuard<'_, B::Tx>> {
        let guard = self.slot.lock().await;
        MutexGuard::try_map(guard, Option::as_mut)
            .map_err(|_| DbError::internal("Transaction is no longer active"))
    }

    /// Remove the transaction from the slot, leaving it inactive.
    pub async fn take(&self) -> Option<B::Tx> {
        self.slot.lock().await.take()
    }
}

impl<B: Backend> Clone for TxHandle<B> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<B: Backend> std::fmt::Debug for TxHandle<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxHandle")
            .field("shared", &Arc::strong_count(&self.slot))
            .finish_non_exhaustive()
    }
}
