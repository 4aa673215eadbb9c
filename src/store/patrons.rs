//! Patron store
//!
//! Stands in for the external user directory: the core only reads
//! identity, role and the active flag.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::patron::{NewPatron, Patron},
    store::IdGenerator,
};

#[derive(Clone)]
pub struct PatronStore {
    records: Arc<RwLock<HashMap<i64, Patron>>>,
    ids: IdGenerator,
}

impl PatronStore {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ids,
        }
    }

    pub fn insert(&self, new: NewPatron) -> Patron {
        let patron = Patron {
            id: self.ids.next_id(),
            matricule: new.matricule,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            role: new.role,
            active: true,
        };
        self.records
            .write()
            .unwrap()
            .insert(patron.id, patron.clone());
        patron
    }

    pub fn get(&self, id: i64) -> AppResult<Patron> {
        self.records
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound {
                entity: "Patron",
                key: id,
            })
    }

    pub fn deactivate(&self, id: i64) -> AppResult<()> {
        let mut records = self.records.write().unwrap();
        let patron = records.get_mut(&id).ok_or(AppError::NotFound {
            entity: "Patron",
            key: id,
        })?;
        patron.active = false;
        Ok(())
    }
}
