//! In-memory item storage.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::items::ItemStore,
    domain::items::{Item, ItemName},
};

/// Process-local item store. Contents live for the lifetime of the server.
pub struct InMemoryItemStore {
    items: Mutex<Vec<Item>>,
    next_id: AtomicU32,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Seed the store with named items, mainly for demos and tests.
    pub fn with_items<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let store = Self::new();
        {
            let mut items = store.lock();
            for name in names {
                if let Ok(name) = ItemName::parse(name.as_ref()) {
                    let id = store.next_id.fetch_add(1, Ordering::Relaxed);
                    items.push(Item {
                        id,
                        name,
                        created_at: OffsetDateTime::now_utc(),
                    });
                }
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Item>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_items(&self) -> Vec<Item> {
        self.lock().clone()
    }

    async fn insert_item(&self, name: ItemName) -> Item {
        let item = Item {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name,
            created_at: OffsetDateTime::now_utc(),
        };
        self.lock().push(item.clone());
        item
    }

    async fn delete_item(&self, id: u32) -> Option<Item> {
        let mut items = self.lock();
        let index = items.iter().position(|item| item.id == id)?;
        Some(items.remove(index))
    }
}
