//! Export control and estimate handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::state::AppState;
use crate::domain::dto::check_count;
use crate::domain::{
    ApiResponse, EstimateQuery, EstimateResponse, GenerationRequest, IssuerDefinition,
    SessionSnapshot, StartExportRequest,
};
use crate::error::{AppError, Result};
use crate::service::{ExportCoordinator, Synthesizer, estimate};

/// Start an export session.
///
/// # Errors
///
/// Returns an error if the request is invalid, an issuer is unknown, a
/// session is already active or the output file cannot be created.
pub async fn start_export(
    State(state): State<AppState>,
    Json(req): Json<StartExportRequest>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    req.validate(state.config.export.max_count)
        .map_err(AppError::BadRequest)?;

    let selected = select_issuers(&state, req.issuers).await?;
    let request = GenerationRequest::new(selected, req.count)?;

    let snapshot = run_blocking(&state.coordinator, move |c| {
        c.start(request, &req.output, req.seed)
    })
    .await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// Snapshot of the current session.
///
/// # Errors
///
/// Returns an error if no session was ever started.
pub async fn get_export(State(state): State<AppState>) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    Ok(Json(ApiResponse::success(state.coordinator.snapshot()?)))
}

/// Pause the current session.
///
/// # Errors
///
/// Returns an error if there is no running session.
pub async fn pause_export(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    Ok(Json(ApiResponse::success(state.coordinator.pause()?)))
}

/// Resume the current session.
///
/// # Errors
///
/// Returns an error if there is no paused session.
pub async fn resume_export(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    Ok(Json(ApiResponse::success(state.coordinator.resume()?)))
}

/// Cancel the current session.
///
/// # Errors
///
/// Returns an error if there is no live session.
pub async fn cancel_export(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    Ok(Json(ApiResponse::success(state.coordinator.cancel()?)))
}

/// Estimate output size and generation time.
///
/// # Errors
///
/// Returns an error if the count is invalid or an issuer is unknown.
pub async fn estimate_export(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<ApiResponse<EstimateResponse>>> {
    check_count(query.count, state.config.export.max_count)?;

    let selected = select_issuers(&state, query.labels()).await?;
    let synth = Synthesizer::new(selected)?;
    let samples = state.config.export.estimate_samples;
    let count = query.count;

    let report = tokio::task::spawn_blocking(move || estimate::estimate(&synth, count, samples))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(report)))
}

/// Resolve labels against the working set, or take all of it.
async fn select_issuers(
    state: &AppState,
    labels: Option<Vec<String>>,
) -> Result<Vec<IssuerDefinition>> {
    let Some(labels) = labels else {
        return Ok(state.catalog.list().await?);
    };

    let mut selected: Vec<IssuerDefinition> = Vec::with_capacity(labels.len());
    for label in labels {
        if selected.iter().any(|d| d.label() == label) {
            continue;
        }
        let def = state
            .catalog
            .get(&label)
            .await?
            .ok_or(AppError::IssuerNotFound(label))?;
        selected.push(def);
    }
    Ok(selected)
}

/// Run a coordinator call that may join a thread or touch the filesystem.
async fn run_blocking<T, F>(coordinator: &Arc<ExportCoordinator>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&ExportCoordinator) -> Result<T> + Send + 'static,
{
    let coordinator = Arc::clone(coordinator);
    tokio::task::spawn_blocking(move || f(&coordinator))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}
