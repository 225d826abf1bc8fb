//! Books API - Main entry point.

use books_api::config::Config;
use books_api::db::Database;
use books_api::server::HttpServer;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(&config);

    info!(
        database = %config.masked_database_url(),
        "Starting Books API v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    let db = match Database::connect(&config.database_url, config.pool_options()).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!(
                error = %e,
                suggestion = e.suggestion().unwrap_or_default(),
                "Failed to connect to database"
            );
            std::process::exit(1);
        }
    };

    let server = HttpServer::new(
        db,
        &config.http_host,
        config.http_port,
        config.shutdown_timeout_duration(),
    );

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}
