//! Catalog factory.
//!
//! Builds the working set from the built-in presets and configured records.

use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::domain::IssuerDefinition;
use crate::domain::presets::builtin_issuers;
use crate::error::{AppError, CatalogError};
use crate::storage::memory::MemoryCatalog;
use crate::storage::traits::CatalogStore;

/// Create the catalog described by `config`.
///
/// Presets come first (when enabled), followed by configured records. A
/// configured record whose label matches a preset replaces it in place.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for an invalid configured record and
/// [`AppError::IssuerExists`] if two configured records share a label.
pub async fn create_catalog(config: &CatalogConfig) -> Result<Arc<dyn CatalogStore>, AppError> {
    let mut definitions = if config.builtin_presets {
        builtin_issuers()?
    } else {
        Vec::new()
    };
    let mut overridden = vec![false; definitions.len()];

    for record in &config.issuers {
        let def = IssuerDefinition::from_record(record)?;
        match definitions.iter().position(|d| d.label() == def.label()) {
            Some(i) if i < overridden.len() && !overridden[i] => {
                overridden[i] = true;
                definitions[i] = def;
            }
            Some(_) => return Err(CatalogError::IssuerExists(def.label().to_string()).into()),
            None => definitions.push(def),
        }
    }

    let catalog = MemoryCatalog::with_definitions(definitions)?;
    catalog.health_check().await?;

    Ok(Arc::new(catalog))
}
