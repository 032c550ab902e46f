//! Catalog trait definitions.
//!
//! The working set of issuer definitions sits behind this trait so the
//! in-memory store can be swapped for a persistent one without touching the
//! handlers.

use async_trait::async_trait;

use crate::domain::IssuerDefinition;
use crate::error::CatalogResult;

/// Working-set storage operations.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All definitions, in insertion order.
    async fn list(&self) -> CatalogResult<Vec<IssuerDefinition>>;

    /// Get a definition by label.
    async fn get(&self, label: &str) -> CatalogResult<Option<IssuerDefinition>>;

    /// Add a new definition.
    ///
    /// Fails with `IssuerExists` if the label is taken.
    async fn insert(&self, definition: IssuerDefinition) -> CatalogResult<()>;

    /// Replace an existing definition as a whole, keeping its position.
    ///
    /// Fails with `IssuerNotFound` if the label is unknown.
    async fn replace(&self, definition: IssuerDefinition) -> CatalogResult<()>;

    /// Remove a definition. Returns whether it existed.
    async fn remove(&self, label: &str) -> CatalogResult<bool>;

    /// Check if the backend is usable.
    async fn health_check(&self) -> CatalogResult<()>;

    /// Get the backend name.
    fn backend_name(&self) -> &'static str;
}

/// Trait object alias for `CatalogStore`.
pub type DynCatalog = dyn CatalogStore;
