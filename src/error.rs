//! Error types for the books API.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Connection and database variants carry a suggestion so that operators can act
//! on the log line without digging through driver output.

use std::time::Duration;
use thiserror::Error;

/// Phase of a transaction in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Begin,
    Commit,
}

impl std::fmt::Display for TxPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Timeout: {operation} exceeded {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "25006" for a write inside a read-only transaction
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Failed to {phase} transaction: {source}")]
    Transaction {
        phase: TxPhase,
        source: Box<DbError>,
    },

    #[error("Failed to execute work unit: {source}")]
    WorkUnit { source: Box<DbError> },

    #[error("Database is not connected")]
    NotConnected,

    #[error("Database connection has been torn down")]
    TornDown,

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a migration error.
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Wrap an error with the transaction phase that produced it.
    pub fn transaction(phase: TxPhase, source: DbError) -> Self {
        Self::Transaction {
            phase,
            source: Box::new(source),
        }
    }

    /// Wrap an error returned by a caller's work unit.
    pub fn work_unit(source: DbError) -> Self {
        Self::WorkUnit {
            source: Box::new(source),
        }
    }

    /// Create a not found error.
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            Self::Transaction { source, .. } | Self::WorkUnit { source } => source.suggestion(),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } | Self::NotConnected => true,
            Self::Transaction { source, .. } | Self::WorkUnit { source } => source.is_retryable(),
            _ => false,
        }
    }

    /// Strip transaction and work-unit wrappers, returning the innermost error.
    pub fn root(&self) -> &DbError {
        match self {
            Self::Transaction { source, .. } | Self::WorkUnit { source } => source.root(),
            other => other,
        }
    }

    /// SQLSTATE of the innermost database error, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self.root() {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::configuration(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                let suggestion = match code.as_deref() {
                    Some("25006") => "Run writes through a read-write transaction",
                    Some("23505") => "A record with the same key already exists",
                    _ => "Check the SQL statement and referenced objects",
                };
                DbError::database(db_err.message(), code, suggestion)
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out acquiring a connection from the pool",
                "Increase max_connections or acquire_timeout, or check for long transactions",
            ),
            sqlx::Error::PoolClosed => DbError::connection(
                "Connection pool is closed",
                "The pool is being replaced; retry the operation",
            ),
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify the sslmode setting and server certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::Migrate(migrate_err) => DbError::from(*migrate_err),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::migration(err.to_string())
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
