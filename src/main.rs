use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use teamon_api::api::handlers::AppStateInner;
use teamon_api::api::routes::create_router;
use teamon_api::config::Config;
use teamon_api::errors::ResponseCode;
use teamon_api::{logging, metrics};

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration decides the log format, so it loads before logging
    let config = Config::from_env().context("Failed to load configuration")?;

    // Dropping the guard flushes the error log file
    let _log_guard = logging::init_tracing(&config.logging).context("Failed to set up logging")?;

    info!(
        environment = %config.app.environment,
        debug = config.app.debug,
        api_prefix = %config.app.api_prefix,
        "Starting TeamOn API v{}",
        env!("CARGO_PKG_VERSION")
    );

    ResponseCode::verify_registry().context("Response code registry is inconsistent")?;
    info!("Response code registry verified ({} codes)", ResponseCode::ALL.len());

    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    let state = Arc::new(AppStateInner::new(config.clone()));
    let app = create_router(state);

    let addr = config.server_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
