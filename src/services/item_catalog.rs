//! Item status collaborator used by the checkout saga

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::item::ItemStatus;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("item {0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Flip the listing to sold. Marking an already sold item is not an error.
    async fn mark_sold(&self, item_id: &str) -> Result<(), ItemError>;
}

#[derive(Debug, Default)]
pub struct InMemoryItemCatalog {
    items: RwLock<HashMap<String, ItemStatus>>,
}

impl InMemoryItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_available(&self, item_id: &str) {
        self.items
            .write()
            .insert(item_id.to_string(), ItemStatus::Available);
    }

    pub fn status(&self, item_id: &str) -> Option<ItemStatus> {
        self.items.read().get(item_id).copied()
    }
}

#[async_trait]
impl ItemCatalog for InMemoryItemCatalog {
    async fn mark_sold(&self, item_id: &str) -> Result<(), ItemError> {
        match self.items.write().get_mut(item_id) {
            Some(status) => {
                *status = ItemStatus::Sold;
                Ok(())
            }
            None => Err(ItemError::NotFound(item_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_sold() {
        let catalog = InMemoryItemCatalog::new();
        catalog.insert_available("i1");

        catalog.mark_sold("i1").await.unwrap();
        assert_eq!(catalog.status("i1"), Some(ItemStatus::Sold));

        // second call is a no-op
        catalog.mark_sold("i1").await.unwrap();
        assert_eq!(catalog.status("i1"), Some(ItemStatus::Sold));
    }

    #[tokio::test]
    async fn test_mark_sold_unknown_item() {
        let catalog = InMemoryItemCatalog::new();
        let result = catalog.mark_sold("missing").await;
        assert!(matches!(result, Err(ItemError::NotFound(id)) if id == "missing"));
    }
}
