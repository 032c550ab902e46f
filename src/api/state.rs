//! Application state for Axum handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;
use crate::service::ExportCoordinator;
use crate::storage::CatalogStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Working set of issuer definitions.
    pub catalog: Arc<dyn CatalogStore>,
    /// Export session owner.
    pub coordinator: Arc<ExportCoordinator>,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: Arc<AppConfig>,
        catalog: Arc<dyn CatalogStore>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let coordinator = Arc::new(ExportCoordinator::new(&config.export));

        Self {
            config,
            catalog,
            coordinator,
            metrics,
        }
    }
}
