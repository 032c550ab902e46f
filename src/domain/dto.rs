//! Data Transfer Objects for API requests and responses.

use serde::{Deserialize, Serialize};

use super::issuer::IssuerDefinition;
use crate::error::ValidationError;

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (0 = success, non-zero = error).
    pub code: i32,

    /// Human-readable message.
    pub message: String,

    /// Response data (null on error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response.
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    /// Create an error response.
    pub fn error(code: i32, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response with no data.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: None,
        }
    }
}

/// Query parameter selecting one issuer by label.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelQuery {
    /// Issuer label.
    pub label: String,
}

/// Working-set listing.
#[derive(Debug, Clone, Serialize)]
pub struct IssuerListResponse {
    /// Definitions in working-set order.
    pub items: Vec<IssuerDefinition>,
    /// Number of definitions.
    pub total: usize,
}

impl IssuerListResponse {
    /// Wrap a list of definitions.
    #[must_use]
    pub fn new(items: Vec<IssuerDefinition>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

/// Request to start an export session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartExportRequest {
    /// Labels to draw from. Absent means the whole working set.
    #[serde(default)]
    pub issuers: Option<Vec<String>>,

    /// Number of values to produce.
    pub count: u64,

    /// Output file name, resolved inside the configured output directory.
    pub output: String,

    /// Seed for a reproducible run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl StartExportRequest {
    /// Validate the request against the configured maximum count.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self, max_count: u64) -> Result<(), String> {
        check_count(self.count, max_count).map_err(|e| e.to_string())?;
        if self.output.trim().is_empty() {
            return Err("output is required".to_string());
        }
        if let Some(issuers) = &self.issuers
            && issuers.is_empty()
        {
            return Err("issuers cannot be an empty list".to_string());
        }
        Ok(())
    }
}

/// Query parameters for an estimate.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateQuery {
    /// Number of values.
    pub count: u64,

    /// Comma-separated labels. Absent means the whole working set.
    #[serde(default)]
    pub issuers: Option<String>,
}

impl EstimateQuery {
    /// Selected labels, if any.
    #[must_use]
    pub fn labels(&self) -> Option<Vec<String>> {
        self.issuers.as_ref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// Estimated output size and generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    /// Number of values.
    pub count: u64,
    /// Expected output size in bytes.
    pub bytes: u64,
    /// Human-readable size.
    pub size: String,
    /// Measured time per value in nanoseconds.
    pub per_number_ns: u64,
    /// Expected total time in milliseconds.
    pub duration_ms: u64,
    /// Human-readable duration.
    pub duration: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Service version.
    pub version: String,
}

/// Readiness check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Overall readiness status.
    pub ready: bool,

    /// Individual component statuses.
    pub components: ReadyComponents,
}

/// Component readiness statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyComponents {
    /// Catalog backend status.
    pub catalog: bool,
    /// Output directory is writable.
    pub output_dir: bool,
}

/// Check a requested count against the configured maximum.
///
/// # Errors
///
/// Returns [`ValidationError::ZeroCount`] or [`ValidationError::CountTooLarge`].
pub const fn check_count(count: u64, max: u64) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::ZeroCount);
    }
    if count > max {
        return Err(ValidationError::CountTooLarge { count, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_request(count: u64, output: &str) -> StartExportRequest {
        StartExportRequest {
            issuers: None,
            count,
            output: output.to_string(),
            seed: None,
        }
    }

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success(vec![1, 2, 3]);
        assert_eq!(response.code, 0);
        assert_eq!(response.message, "success");
        assert_eq!(response.data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_api_response_error() {
        let response = ApiResponse::<()>::error(1001, "issuer not found");
        assert_eq!(response.code, 1001);
        assert!(response.data.is_none());
    }

    #[test]
    fn test_start_request_validation() {
        assert!(start_request(10, "cards.txt").validate(100).is_ok());
        assert!(start_request(0, "cards.txt").validate(100).is_err());
        assert!(start_request(101, "cards.txt").validate(100).is_err());
        assert!(start_request(10, "  ").validate(100).is_err());

        let mut req = start_request(10, "cards.txt");
        req.issuers = Some(vec![]);
        assert!(req.validate(100).is_err());
    }

    #[test]
    fn test_estimate_query_labels() {
        let query = EstimateQuery {
            count: 5,
            issuers: Some("Visa, JCB,,".to_string()),
        };
        assert_eq!(
            query.labels(),
            Some(vec!["Visa".to_string(), "JCB".to_string()])
        );

        let query = EstimateQuery {
            count: 5,
            issuers: None,
        };
        assert!(query.labels().is_none());
    }

    #[test]
    fn test_check_count() {
        assert_eq!(check_count(0, 10), Err(ValidationError::ZeroCount));
        assert_eq!(
            check_count(11, 10),
            Err(ValidationError::CountTooLarge { count: 11, max: 10 })
        );
        assert!(check_count(10, 10).is_ok());
    }
}
