//! HTTP server with graceful shutdown.

use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::server::routes::{AppState, router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Serves the books API until a shutdown signal arrives, then tears the
/// database down.
pub struct HttpServer {
    db: Arc<Database>,
    /// Host to bind to
    host: String,
    /// Port to bind to
    port: u16,
    /// Grace period for in-flight requests after the first signal
    shutdown_timeout: Duration,
}

impl HttpServer {
    pub fn new(
        db: Arc<Database>,
        host: impl Into<String>,
        port: u16,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            db,
            host: host.into(),
            port,
            shutdown_timeout,
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        let app = router(AppState::new(Arc::clone(&self.db)));

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;

        info!(addr = %bind_addr, "HTTP server listening");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();

        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        // Race between: server draining normally vs grace timeout/second signal
        let served = tokio::select! {
            result = server => result.map_err(|e| {
                error!(error = %e, "HTTP server error");
                DbError::internal(format!("HTTP server error: {}", e))
            }),
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "Waiting for in-flight requests (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(self.shutdown_timeout) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => Ok(()),
        };

        info!("Closing database connections");
        if let Err(e) = self.db.shutdown(self.shutdown_timeout).await {
            warn!(error = %e, "Database pool did not drain in time, forcing closure");
        }

        if served.is_ok() {
            info!("HTTP server stopped");
        }
        served
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
