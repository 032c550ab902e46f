//! Export and catalog configuration.

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

use crate::domain::IssuerRecord;

/// Export engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory output files are created in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Bytes per sink write.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Upper bound on a single pause wait, in milliseconds.
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// Largest count a single request may ask for.
    #[serde(default = "default_max_count")]
    pub max_count: u64,

    /// Syntheses timed per estimate.
    #[serde(default = "default_estimate_samples")]
    pub estimate_samples: u32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./exports")
}

const fn default_chunk_size() -> usize {
    4096
}

const fn default_pause_poll_ms() -> u64 {
    250
}

const fn default_max_count() -> u64 {
    1_000_000_000_000
}

const fn default_estimate_samples() -> u32 {
    1000
}

impl ExportConfig {
    /// Validate the export configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a size or interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Message(
                "export.chunk_size cannot be 0".to_string(),
            ));
        }
        if self.pause_poll_ms == 0 {
            return Err(ConfigError::Message(
                "export.pause_poll_ms cannot be 0".to_string(),
            ));
        }
        if self.max_count == 0 {
            return Err(ConfigError::Message(
                "export.max_count cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            chunk_size: default_chunk_size(),
            pause_poll_ms: default_pause_poll_ms(),
            max_count: default_max_count(),
            estimate_samples: default_estimate_samples(),
        }
    }
}

/// Working-set seeding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Seed the working set with the built-in presets.
    #[serde(default = "default_builtin_presets")]
    pub builtin_presets: bool,

    /// Additional issuer records.
    #[serde(default)]
    pub issuers: Vec<IssuerRecord>,
}

const fn default_builtin_presets() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            builtin_presets: true,
            issuers: Vec::new(),
        }
    }
}
