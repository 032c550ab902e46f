//! Domain models for luhngen.
//!
//! This module contains the issuer data model, prefix range parsing, export
//! session types and API contracts.

pub mod dto;
pub mod issuer;
pub mod prefix;
pub mod presets;
pub mod session;

pub use dto::{
    ApiResponse, EstimateQuery, EstimateResponse, HealthResponse, IssuerListResponse, LabelQuery,
    ReadyComponents, ReadyResponse, StartExportRequest,
};
pub use issuer::{IssuerDefinition, IssuerRecord, validate_issuer, validate_length};
pub use prefix::{PrefixRange, parse_prefix_ranges};
pub use session::{ExportSummary, GenerationRequest, SessionSnapshot, SessionState};
