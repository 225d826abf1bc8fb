//! Database layer.
//!
//! - [`Backend`] / [`Querier`]: driver and query-executor seams
//! - [`ConnectionManager`]: pool ownership, migrations, health loop
//! - [`TransactionCoordinator`]: run work units in read-only or read-write transactions
//! - [`Database`]: facade over the two

pub mod backend;
pub mod database;
pub mod health;
pub mod pool;
pub mod postgres;
pub mod queries;
pub mod transaction;

pub use backend::{AccessMode, Backend, Querier, TxHandle};
pub use database::Database;
pub use health::{ConnectionHealth, ConnectionState, ConnectionStats};
pub use pool::{ConnectionManager, DisconnectMode};
pub use postgres::{MIGRATOR, PgBackend};
pub use queries::{BookQueries, Queries};
pub use transaction::TransactionCoordinator;
