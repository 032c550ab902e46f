//! Health check handlers.

use std::path::Path;

use axum::{Json, extract::State, http::StatusCode};

use crate::api::state::AppState;
use crate::domain::{ApiResponse, HealthResponse, ReadyComponents, ReadyResponse};
use crate::error::ErrorCode;

/// Liveness probe - always returns 200 if the service is running.
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Readiness probe - checks the catalog and the output directory.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<ReadyResponse>>) {
    let catalog = state.catalog.health_check().await.is_ok();
    let output_dir = output_dir_writable(state.coordinator.output_dir()).await;
    let ready = catalog && output_dir;

    let data = ReadyResponse {
        ready,
        components: ReadyComponents {
            catalog,
            output_dir,
        },
    };

    if ready {
        (StatusCode::OK, Json(ApiResponse::success(data)))
    } else {
        let response = ApiResponse {
            code: ErrorCode::SERVICE_UNAVAILABLE.as_i32(),
            message: "service unavailable".to_string(),
            data: Some(data),
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    state.metrics.as_ref().map_or_else(
        || (StatusCode::NOT_FOUND, "metrics disabled\n".to_string()),
        |handle| (StatusCode::OK, handle.render()),
    )
}

async fn output_dir_writable(dir: &Path) -> bool {
    if tokio::fs::create_dir_all(dir).await.is_err() {
        return false;
    }
    tokio::fs::metadata(dir)
        .await
        .is_ok_and(|m| m.is_dir() && !m.permissions().readonly())
}
