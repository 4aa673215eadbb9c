//! Item store and inventory counter
//!
//! Owns the `available` counter for every item. Callers must hold the
//! per-item lock (see [`crate::store::Store::lock_item`]) around any
//! read-check-mutate sequence involving these operations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::item::{Item, NewItem},
    store::IdGenerator,
};

#[derive(Clone)]
pub struct ItemStore {
    records: Arc<RwLock<HashMap<i64, Item>>>,
    ids: IdGenerator,
}

impl ItemStore {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ids,
        }
    }

    /// Register an item (catalog seeding; metadata is owned elsewhere)
    pub fn insert(&self, new: NewItem) -> AppResult<Item> {
        if new.total_copies == 0 {
            return Err(AppError::InvalidState(
                "an item must have at least one copy".to_string(),
            ));
        }
        let item = Item {
            id: self.ids.next_id(),
            isbn: new.isbn,
            title: new.title,
            author: new.author,
            total_copies: new.total_copies,
            available: new.total_copies,
        };
        self.records.write().unwrap().insert(item.id, item.clone());
        Ok(item)
    }

    pub fn get(&self, id: i64) -> AppResult<Item> {
        self.records
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound {
                entity: "Item",
                key: id,
            })
    }

    pub fn list(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.records.read().unwrap().values().cloned().collect();
        items.sort_by_key(|i| i.id);
        items
    }

    /// Take one copy off the shelf. Returns false when none are available.
    pub fn try_decrement(&self, id: i64) -> AppResult<bool> {
        let mut records = self.records.write().unwrap();
        let item = records.get_mut(&id).ok_or(AppError::NotFound {
            entity: "Item",
            key: id,
        })?;
        if item.available == 0 {
            return Ok(false);
        }
        item.available -= 1;
        Ok(true)
    }

    /// Put one copy back on the shelf. Increments always pair with a prior
    /// decrement, so exceeding `total_copies` means a broken invariant.
    pub fn increment(&self, id: i64) -> AppResult<()> {
        let mut records = self.records.write().unwrap();
        let item = records.get_mut(&id).ok_or(AppError::NotFound {
            entity: "Item",
            key: id,
        })?;
        if item.available >= item.total_copies {
            tracing::error!(
                item_id = id,
                available = item.available,
                total_copies = item.total_copies,
                "inventory invariant broken: increment past total copies"
            );
            return Err(AppError::Internal(format!(
                "item {} availability would exceed total copies",
                id
            )));
        }
        item.available += 1;
        Ok(())
    }
}
