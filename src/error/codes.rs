//! Error code constants.
//!
//! Error codes are organized by category:
//! - 1xxx: Catalog errors
//! - 3xxx: Validation errors
//! - 4xxx: Session/resource errors
//! - 5xxx: Internal/System errors

/// Error code type with semantic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    // ===== Catalog Errors (1xxx) =====

    /// Issuer definition not found in the working set.
    pub const ISSUER_NOT_FOUND: Self = Self(1001);

    /// Issuer definition with the same label already exists.
    pub const ISSUER_EXISTS: Self = Self(1002);

    /// No issuer definitions selected for generation.
    pub const EMPTY_SELECTION: Self = Self(1003);

    // ===== Validation Errors (3xxx) =====

    /// Bad request / invalid parameters.
    pub const BAD_REQUEST: Self = Self(3001);

    /// Malformed issuer label, length or prefix specification.
    pub const INVALID_ISSUER: Self = Self(3002);

    // ===== Session/Resource Errors (4xxx) =====

    /// Resource not found.
    pub const NOT_FOUND: Self = Self(4001);

    /// An export session is already running or paused.
    pub const SESSION_ACTIVE: Self = Self(4002);

    /// No export session has been started.
    pub const NO_SESSION: Self = Self(4003);

    /// The requested control transition is not legal in the current state.
    pub const INVALID_TRANSITION: Self = Self(4004);

    // ===== Internal/System Errors (5xxx) =====

    /// Catalog backend error.
    pub const CATALOG_ERROR: Self = Self(5001);

    /// Internal server error.
    pub const INTERNAL_ERROR: Self = Self(5002);

    /// Service unavailable.
    pub const SERVICE_UNAVAILABLE: Self = Self(5003);

    /// Output sink could not be opened or written.
    pub const SINK_ERROR: Self = Self(5004);

    /// Get the error code as an i32.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Get the category of this error code.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.0 {
            1000..=1999 => ErrorCategory::Catalog,
            3000..=3999 => ErrorCategory::Validation,
            4000..=4999 => ErrorCategory::Session,
            5000..=5999 => ErrorCategory::Internal,
            _ => ErrorCategory::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

/// Error category based on error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Catalog/working-set errors (1xxx).
    Catalog,
    /// Validation errors (3xxx).
    Validation,
    /// Export session errors (4xxx).
    Session,
    /// Internal/system errors (5xxx).
    Internal,
    /// Unknown category.
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Validation => write!(f, "validation"),
            Self::Session => write!(f, "session"),
            Self::Internal => write!(f, "internal"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
