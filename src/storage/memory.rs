//! In-memory catalog.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::IssuerDefinition;
use crate::error::{CatalogError, CatalogResult};
use crate::storage::traits::CatalogStore;

/// Working set kept in a vector, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: RwLock<Vec<IssuerDefinition>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `definitions`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IssuerExists`] on a duplicate label.
    pub fn with_definitions(
        definitions: impl IntoIterator<Item = IssuerDefinition>,
    ) -> CatalogResult<Self> {
        let mut items: Vec<IssuerDefinition> = Vec::new();
        for def in definitions {
            if items.iter().any(|d| d.label() == def.label()) {
                return Err(CatalogError::IssuerExists(def.label().to_string()));
            }
            items.push(def);
        }
        Ok(Self {
            items: RwLock::new(items),
        })
    }

    fn position(items: &[IssuerDefinition], label: &str) -> Option<usize> {
        items.iter().position(|d| d.label() == label)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list(&self) -> CatalogResult<Vec<IssuerDefinition>> {
        Ok(self.items.read().clone())
    }

    async fn get(&self, label: &str) -> CatalogResult<Option<IssuerDefinition>> {
        let items = self.items.read();
        Ok(Self::position(&items, label).map(|i| items[i].clone()))
    }

    async fn insert(&self, definition: IssuerDefinition) -> CatalogResult<()> {
        let mut items = self.items.write();
        if Self::position(&items, definition.label()).is_some() {
            return Err(CatalogError::IssuerExists(definition.label().to_string()));
        }
        items.push(definition);
        Ok(())
    }

    async fn replace(&self, definition: IssuerDefinition) -> CatalogResult<()> {
        let mut items = self.items.write();
        let index = Self::position(&items, definition.label())
            .ok_or_else(|| CatalogError::IssuerNotFound(definition.label().to_string()))?;
        items[index] = definition;
        Ok(())
    }

    async fn remove(&self, label: &str) -> CatalogResult<bool> {
        let mut items = self.items.write();
        Ok(Self::position(&items, label)
            .map(|i| items.remove(i))
            .is_some())
    }

    async fn health_check(&self) -> CatalogResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
