//! Books API library
//!
//! A CRUD service for books on PostgreSQL. The data layer keeps a single
//! health-checked connection pool and runs every request inside a read-only
//! or read-write transaction.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;

pub use config::Config;
pub use db::Database;
pub use error::{DbError, DbResult};
