//! Issuer working-set handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::info;

use crate::api::state::AppState;
use crate::domain::{ApiResponse, IssuerDefinition, IssuerListResponse, IssuerRecord, LabelQuery};
use crate::error::{AppError, Result};

/// List the working set in insertion order.
///
/// # Errors
///
/// Returns an error if the catalog is unavailable.
pub async fn list_issuers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<IssuerListResponse>>> {
    let items = state.catalog.list().await?;
    Ok(Json(ApiResponse::success(IssuerListResponse::new(items))))
}

/// Get one issuer by label.
///
/// # Errors
///
/// Returns an error if the issuer is not found.
pub async fn get_issuer(
    State(state): State<AppState>,
    Query(query): Query<LabelQuery>,
) -> Result<Json<ApiResponse<IssuerDefinition>>> {
    let def = state
        .catalog
        .get(&query.label)
        .await?
        .ok_or(AppError::IssuerNotFound(query.label))?;
    Ok(Json(ApiResponse::success(def)))
}

/// Add a new issuer.
///
/// # Errors
///
/// Returns an error if the record is invalid or the label is taken.
pub async fn create_issuer(
    State(state): State<AppState>,
    Json(record): Json<IssuerRecord>,
) -> Result<Json<ApiResponse<IssuerDefinition>>> {
    let def = IssuerDefinition::from_record(&record)?;
    state.catalog.insert(def.clone()).await?;
    info!(label = %def.label(), length = def.length(), "Issuer created");
    Ok(Json(ApiResponse::success(def)))
}

/// Replace an existing issuer.
///
/// # Errors
///
/// Returns an error if the record is invalid or the label is unknown.
pub async fn replace_issuer(
    State(state): State<AppState>,
    Json(record): Json<IssuerRecord>,
) -> Result<Json<ApiResponse<IssuerDefinition>>> {
    let def = IssuerDefinition::from_record(&record)?;
    state.catalog.replace(def.clone()).await?;
    info!(label = %def.label(), length = def.length(), "Issuer replaced");
    Ok(Json(ApiResponse::success(def)))
}

/// Remove an issuer.
///
/// # Errors
///
/// Returns an error if the issuer is not found.
pub async fn delete_issuer(
    State(state): State<AppState>,
    Query(query): Query<LabelQuery>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.catalog.remove(&query.label).await? {
        return Err(AppError::IssuerNotFound(query.label));
    }
    info!(label = %query.label, "Issuer removed");
    Ok(Json(ApiResponse::ok()))
}

/// Validate a record without storing it.
///
/// # Errors
///
/// Returns the validation error naming the offending field or token.
pub async fn validate_issuer(
    Json(record): Json<IssuerRecord>,
) -> Result<Json<ApiResponse<IssuerDefinition>>> {
    let def = IssuerDefinition::from_record(&record)?;
    Ok(Json(ApiResponse::success(def)))
}
