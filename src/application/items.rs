//! Item inventory service: the host surface the toast and confirmation
//! components act on.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    error::DomainError,
    items::{Item, ItemName},
};

/// Storage port for inventory items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_items(&self) -> Vec<Item>;
    async fn insert_item(&self, name: ItemName) -> Item;
    async fn delete_item(&self, id: u32) -> Option<Item>;
}

pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub async fn list_items(&self) -> Vec<Item> {
        self.store.list_items().await
    }

    pub async fn create_item(&self, raw_name: &str) -> Result<Item, DomainError> {
        let name = ItemName::parse(raw_name)?;
        let duplicate = self
            .store
            .list_items()
            .await
            .iter()
            .any(|item| item.name == name);
        if duplicate {
            return Err(DomainError::validation(format!(
                "an item named `{}` already exists",
                name.as_str()
            )));
        }
        Ok(self.store.insert_item(name).await)
    }

    pub async fn delete_item(&self, id: u32) -> Result<Item, DomainError> {
        self.store
            .delete_item(id)
            .await
            .ok_or_else(|| DomainError::not_found("item"))
    }
}
