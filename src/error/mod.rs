//! Error handling module.
//!
//! Domain errors (`ValidationError`, `ExportError`, `CatalogError`) are plain
//! `thiserror` enums usable without the HTTP layer. `AppError` wraps them for
//! the control surface and maps each to a status code and a stable error code.

pub mod codes;

use std::io;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub use codes::ErrorCode;

/// Rejection of a malformed issuer label, length, prefix spec or count.
///
/// Every variant carries enough context (field value or offending token and
/// its 1-based position) for a caller to correct the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Label is empty or consists only of whitespace.
    #[error("issuer label cannot be empty or whitespace")]
    EmptyLabel,

    /// Target length outside `2..=32`.
    #[error("length must be between 2 and 32, got {0}")]
    LengthOutOfRange(u32),

    /// Prefix specification is empty.
    #[error("prefix specification cannot be empty")]
    EmptyPrefixSpec,

    /// Prefix specification ends with a separator.
    #[error("prefix specification cannot end with ','")]
    TrailingSeparator,

    /// A token between two separators is empty.
    #[error("prefix token #{position} is empty")]
    EmptyToken {
        /// 1-based token position.
        position: usize,
    },

    /// A token is neither `D+` nor `D+-D+`.
    #[error("prefix token #{position} '{token}' is not a number or a start-end range")]
    MalformedToken {
        /// 1-based token position.
        position: usize,
        /// The offending token.
        token: String,
    },

    /// A value in a token is zero.
    #[error("prefix token #{position} '{token}' must be greater than zero")]
    ZeroValue {
        /// 1-based token position.
        position: usize,
        /// The offending token.
        token: String,
    },

    /// A range ends before it starts.
    #[error("prefix token #{position} '{token}' ends before it starts")]
    ReversedRange {
        /// 1-based token position.
        position: usize,
        /// The offending token.
        token: String,
    },

    /// A value leaves no room for the check digit of a `length`-digit number.
    #[error("prefix token #{position} '{token}' must have fewer than {length} digits")]
    TooManyDigits {
        /// 1-based token position.
        position: usize,
        /// The offending token.
        token: String,
        /// Target length of the owning definition.
        length: u8,
    },

    /// Requested count is zero.
    #[error("count must be at least 1")]
    ZeroCount,

    /// Requested count exceeds the configured maximum.
    #[error("count cannot exceed {max}, got {count}")]
    CountTooLarge {
        /// Requested count.
        count: u64,
        /// Configured maximum.
        max: u64,
    },
}

/// Failure of an export run.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Synthesis requested with zero eligible issuer definitions.
    #[error("no issuer definitions selected")]
    EmptySelection,

    /// Request failed validation before anything ran.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Output destination could not be created/opened.
    #[error("failed to open output {path}: {source}")]
    SinkOpen {
        /// Destination path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing a chunk (or closing the sink) failed mid-run.
    #[error("failed to write output: {0}")]
    SinkWrite(#[source] io::Error),

    /// The worker thread could not be spawned.
    #[error("failed to spawn export worker: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread panicked.
    #[error("export worker panicked")]
    WorkerPanicked,
}

/// Catalog (working set) error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// An issuer with this label already exists.
    #[error("Issuer already exists: {0}")]
    IssuerExists(String),

    /// No issuer with this label exists.
    #[error("Issuer not found: {0}")]
    IssuerNotFound(String),

    /// Backend not available.
    #[error("Catalog backend unavailable")]
    Unavailable,
}

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Issuer definition not found.
    #[error("Issuer not found: {0}")]
    IssuerNotFound(String),

    /// Issuer definition already exists.
    #[error("Issuer already exists: {0}")]
    IssuerExists(String),

    /// Invalid issuer definition or request value.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No issuer definitions selected.
    #[error("No issuer definitions selected")]
    EmptySelection,

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A session is already running or paused.
    #[error("An export session is already active")]
    SessionActive,

    /// No session exists yet.
    #[error("No export session")]
    NoSession,

    /// Control command not legal in the current session state.
    #[error("Cannot {0} the export session in its current state")]
    InvalidTransition(String),

    /// Output sink failure.
    #[error("Output error: {0}")]
    Sink(String),

    /// Catalog backend unavailable.
    #[error("Catalog unavailable")]
    CatalogUnavailable,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::IssuerNotFound(_) => ErrorCode::ISSUER_NOT_FOUND,
            Self::IssuerExists(_) => ErrorCode::ISSUER_EXISTS,
            Self::Validation(_) => ErrorCode::INVALID_ISSUER,
            Self::EmptySelection => ErrorCode::EMPTY_SELECTION,
            Self::BadRequest(_) => ErrorCode::BAD_REQUEST,
            Self::NotFound(_) => ErrorCode::NOT_FOUND,
            Self::SessionActive => ErrorCode::SESSION_ACTIVE,
            Self::NoSession => ErrorCode::NO_SESSION,
            Self::InvalidTransition(_) => ErrorCode::INVALID_TRANSITION,
            Self::Sink(_) => ErrorCode::SINK_ERROR,
            Self::CatalogUnavailable => ErrorCode::CATALOG_ERROR,
            Self::Internal(_) => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::IssuerNotFound(_) | Self::NotFound(_) | Self::NoSession => StatusCode::NOT_FOUND,
            Self::IssuerExists(_) | Self::SessionActive | Self::InvalidTransition(_) => {
                StatusCode::CONFLICT
            }
            Self::Validation(_) | Self::EmptySelection | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::CatalogUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Sink(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::IssuerExists(label) => Self::IssuerExists(label),
            CatalogError::IssuerNotFound(label) => Self::IssuerNotFound(label),
            CatalogError::Unavailable => Self::CatalogUnavailable,
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::EmptySelection => Self::EmptySelection,
            ExportError::Validation(e) => Self::Validation(e),
            ExportError::SinkOpen { .. } | ExportError::SinkWrite(_) => Self::Sink(err.to_string()),
            ExportError::Spawn(_) | ExportError::WorkerPanicked => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().as_i32();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error_code = code, status = %status, message = %message, "Request failed");
        } else {
            tracing::warn!(error_code = code, status = %status, message = %message, "Request rejected");
        }

        let body = Json(json!({
            "code": code,
            "message": message,
            "data": null
        }));

        (status, body).into_response()
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias using `CatalogError`.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::IssuerNotFound("visa".to_string()).error_code(),
            ErrorCode::ISSUER_NOT_FOUND
        );
        assert_eq!(AppError::SessionActive.error_code(), ErrorCode::SESSION_ACTIVE);
        assert_eq!(
            AppError::Validation(ValidationError::EmptyLabel).error_code(),
            ErrorCode::INVALID_ISSUER
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NoSession.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::SessionActive.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::EmptySelection.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Sink("disk full".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_catalog_error_mapping() {
        let err: AppError = CatalogError::IssuerExists("jcb".to_string()).into();
        assert!(matches!(err, AppError::IssuerExists(ref l) if l == "jcb"));

        let err: AppError = CatalogError::Unavailable.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_export_error_mapping() {
        let err: AppError = ExportError::EmptySelection.into();
        assert_eq!(err.error_code(), ErrorCode::EMPTY_SELECTION);

        let err: AppError = ExportError::SinkOpen {
            path: "out.txt".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.error_code(), ErrorCode::SINK_ERROR);
        assert!(err.to_string().contains("out.txt"));
    }

    #[test]
    fn test_validation_error_names_token() {
        let err = ValidationError::ReversedRange {
            position: 2,
            token: "5-3".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("#2"));
        assert!(message.contains("5-3"));
    }
}
