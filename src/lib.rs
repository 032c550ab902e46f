//! # luhngen
//!
//! Streams large volumes of Luhn-valid test numbers for configurable issuer
//! definitions, under pause/resume/cancel control with progress reporting.
//!
//! Generated numbers are synthetic test data and must never be treated as
//! real financial credentials.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                           luhngen service                            │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌──────────────────┐  ┌─────────────┐ ┌─────────┐ │
//! │  │  API Layer  │  │  Export engine   │  │   Storage   │ │ Domain  │ │
//! │  │   (Axum)    │→ │ (worker thread)  │→ │ sink/catalog│ │ models  │ │
//! │  └─────────────┘  └──────────────────┘  └─────────────┘ └─────────┘ │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::api::create_router;
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::storage::create_catalog;

/// Run the luhngen service.
///
/// This function:
/// 1. Loads `.env`, configuration files and environment
/// 2. Initializes logging and the metrics recorder
/// 3. Seeds the issuer catalog
/// 4. Starts the HTTP server
/// 5. On shutdown, cancels and joins any running export
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded
/// - A configured issuer is invalid
/// - HTTP server fails to bind
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting luhngen"
    );

    let metrics = if config.observability.metrics_enabled {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let catalog = create_catalog(&config.catalog).await?;
    info!(
        backend = catalog.backend_name(),
        issuers = catalog.list().await?.len(),
        "Catalog initialized"
    );

    let state = AppState::new(Arc::new(config.clone()), catalog, metrics);
    let coordinator = Arc::clone(&state.coordinator);

    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, output_dir = %config.export.output_dir.display(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match tokio::task::spawn_blocking(move || coordinator.shutdown()).await? {
        Some(Ok(summary)) => info!(
            state = %summary.state,
            produced = summary.produced,
            "Export session stopped for shutdown"
        ),
        Some(Err(e)) => error!(error = %e, "Export session ended with error"),
        None => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging based on configuration.
fn init_logging(config: &AppConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.observability.log_format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

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
        () = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
