//! Export session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::issuer::IssuerDefinition;
use crate::error::{ExportError, ValidationError};

/// Lifecycle state of an export session.
///
/// `Idle -> Running -> {Paused <-> Running} -> {Stopped, Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SessionState {
    /// Created, worker not started yet.
    Idle = 0,
    /// Producing numbers.
    Running = 1,
    /// Production suspended until resumed or cancelled.
    Paused = 2,
    /// Cancelled before the requested count was reached.
    Stopped = 3,
    /// Requested count produced and flushed.
    Completed = 4,
    /// A sink write failed mid-run.
    Failed = 5,
}

impl SessionState {
    /// Decode a state stored in an atomic.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Paused,
            3 => Self::Stopped,
            4 => Self::Completed,
            _ => Self::Failed,
        }
    }

    /// Encode for atomic storage.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the session is running or paused.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Whether the session has finished for good.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Stopped => write!(f, "stopped"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single export run request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    selected: Vec<IssuerDefinition>,
    count: u64,
}

impl GenerationRequest {
    /// Build a request.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptySelection`] when no definition is selected
    /// and [`ValidationError::ZeroCount`] when `count` is zero.
    pub fn new(selected: Vec<IssuerDefinition>, count: u64) -> Result<Self, ExportError> {
        if selected.is_empty() {
            return Err(ExportError::EmptySelection);
        }
        if count == 0 {
            return Err(ValidationError::ZeroCount.into());
        }
        Ok(Self { selected, count })
    }

    /// Selected definitions.
    #[must_use]
    pub fn selected(&self) -> &[IssuerDefinition] {
        &self.selected
    }

    /// Number of values to produce.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Take ownership of the selection.
    #[must_use]
    pub fn into_selected(self) -> Vec<IssuerDefinition> {
        self.selected
    }
}

/// Point-in-time view of an export session, safe to hand to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: Uuid,

    /// Current state.
    pub state: SessionState,

    /// Fraction of the requested count produced, in `[0, 1]`.
    pub progress: f64,

    /// Requested count.
    pub requested: u64,

    /// Numbers produced as of the last published flush.
    pub produced: u64,

    /// Output destination.
    pub output: String,

    /// When the session started.
    pub started_at: DateTime<Utc>,

    /// When the session reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Fatal error message, if the session failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a finished export session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Terminal state.
    pub state: SessionState,
    /// Numbers produced.
    pub produced: u64,
    /// Numbers requested.
    pub requested: u64,
    /// Bytes handed to the sink.
    pub bytes_written: u64,
}
