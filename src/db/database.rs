//! Database facade.
//!
//! [`Database`] composes the connection manager and the transaction
//! coordinator into the contract the HTTP layer consumes.

use crate::config::PoolOptions;
use crate::db::backend::{Backend, Querier};
use crate::db::health::{ConnectionState, ConnectionStats};
use crate::db::pool::{ConnectionManager, DisconnectMode};
use crate::db::postgres::PgBackend;
use crate::db::queries::Queries;
use crate::db::transaction::TransactionCoordinator;
use crate::error::{DbError, DbResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Connected database with health monitoring and transactional access.
pub struct Database<B: Backend = PgBackend, Q = Queries> {
    manager: Arc<ConnectionManager<B>>,
    coordinator: TransactionCoordinator<B, Q>,
}

impl Database {
    /// Connect to PostgreSQL, run migrations and start the health loop.
    pub async fn connect(url: &str, options: PoolOptions) -> DbResult<Self> {
        Self::with_backend(PgBackend::new(), url, options).await
    }
}

impl<B, Q> Database<B, Q>
where
    B: Backend,
    Q: Querier<Backend = B>,
{
    /// Connect through the given backend and start the health loop.
    pub async fn with_backend(backend: B, url: &str, options: PoolOptions) -> DbResult<Self> {
        options.validate().map_err(DbError::configuration)?;

        let manager = Arc::new(ConnectionManager::new(backend, url, options));
        manager.connect().await?;
        manager.start_health_loop();

        Ok(Self {
            coordinator: TransactionCoordinator::new(Arc::clone(&manager)),
            manager,
        })
    }

    /// Close the pool. See [`DisconnectMode`].
    pub async fn disconnect(&self, mode: DisconnectMode) {
        self.manager.disconnect(mode).await;
    }

    /// Tear down, giving the pool at most `grace` to drain.
    ///
    /// The teardown flag is set before the pool starts closing, so the
    /// manager is finished even when the drain times out.
    pub async fn shutdown(&self, grace: Duration) -> DbResult<()> {
        tokio::time::timeout(grace, self.manager.disconnect(DisconnectMode::Teardown))
            .await
            .map_err(|_| DbError::timeout("database shutdown", grace))
    }

    /// Run `work` in a read-only transaction, or on `existing` if supplied.
    pub async fn with_read_tx<T, F, Fut>(&self, work: F, existing: Option<&Q>) -> DbResult<T>
    where
        F: FnOnce(Q) -> Fut + Send,
        Fut: Future<Output = DbResult<T>> + Send,
        T: Send,
    {
        self.coordinator.run_read_only(work, existing).await
    }

    /// Run `work` in a read-write transaction, or on `existing` if supplied.
    pub async fn with_tx<T, F, Fut>(&self, work: F, existing: Option<&Q>) -> DbResult<T>
    where
        F: FnOnce(Q) -> Fut + Send,
        Fut: Future<Output = DbResult<T>> + Send,
        T: Send,
    {
        self.coordinator.run_read_write(work, existing).await
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn stats(&self) -> ConnectionStats {
        self.manager.stats()
    }

    pub fn manager(&self) -> &Arc<ConnectionManager<B>> {
        &self.manager
    }
}

impl<B: Backend, Q> std::fmt::Debug for Database<B, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("manager", &self.manager)
            .finish()
    }
}
