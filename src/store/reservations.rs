//! Reservation store
//!
//! Per item, pending reservations form a FIFO queue ordered by creation
//! time. Queue-order sensitive reads and writes happen under the per-item
//! lock held by the calling service.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationStatus},
    store::IdGenerator,
};

#[derive(Clone)]
pub struct ReservationStore {
    records: Arc<RwLock<HashMap<i64, Reservation>>>,
    ids: IdGenerator,
}

impl ReservationStore {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ids,
        }
    }

    pub fn insert(
        &self,
        patron_id: i64,
        item_id: i64,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Reservation {
        let reservation = Reservation {
            id: self.ids.next_id(),
            patron_id,
            item_id,
            created_at,
            expires_at,
            status: ReservationStatus::Pending,
        };
        self.records
            .write()
            .unwrap()
            .insert(reservation.id, reservation.clone());
        reservation
    }

    pub fn get(&self, id: i64) -> AppResult<Reservation> {
        self.records
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound {
                entity: "Reservation",
                key: id,
            })
    }

    /// Replace a reservation record in full
    pub fn update(&self, reservation: &Reservation) -> AppResult<()> {
        let mut records = self.records.write().unwrap();
        match records.get_mut(&reservation.id) {
            Some(existing) => {
                *existing = reservation.clone();
                Ok(())
            }
            None => Err(AppError::NotFound {
                entity: "Reservation",
                key: reservation.id,
            }),
        }
    }

    /// The pending reservation a patron holds for an item, if any.
    /// At most one exists; this query backs that invariant.
    pub fn pending_for(&self, patron_id: i64, item_id: i64) -> Option<Reservation> {
        self.records
            .read()
            .unwrap()
            .values()
            .find(|r| {
                r.patron_id == patron_id
                    && r.item_id == item_id
                    && r.status == ReservationStatus::Pending
            })
            .cloned()
    }

    /// Oldest pending reservation for an item, the next promotion candidate.
    /// Ties on `created_at` break by id so the order stays total.
    pub fn next_pending(&self, item_id: i64) -> Option<Reservation> {
        self.records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.item_id == item_id && r.status == ReservationStatus::Pending)
            .min_by_key(|r| (r.created_at, r.id))
            .cloned()
    }

    /// Pending reservations past their expiry, oldest first
    pub fn expired_pending(&self, now: DateTime<Utc>) -> Vec<Reservation> {
        let mut expired: Vec<Reservation> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.status == ReservationStatus::Pending && r.expires_at < now)
            .cloned()
            .collect();
        expired.sort_by_key(|r| (r.created_at, r.id));
        expired
    }

    /// All reservations for a patron, newest first
    pub fn for_patron(&self, patron_id: i64) -> Vec<Reservation> {
        let mut reservations: Vec<Reservation> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.patron_id == patron_id)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)));
        reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> ReservationStore {
        ReservationStore::new(IdGenerator::new(0))
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn next_pending_is_oldest() {
        let store = store();
        let older = store.insert(1, 9, at(8), at(10));
        store.insert(2, 9, at(9), at(11));

        assert_eq!(store.next_pending(9).unwrap().id, older.id);
    }

    #[test]
    fn fulfilled_entries_leave_the_queue() {
        let store = store();
        let first = store.insert(1, 9, at(8), at(10));
        let second = store.insert(2, 9, at(9), at(11));

        let mut fulfilled = first;
        fulfilled.status = ReservationStatus::Fulfilled;
        store.update(&fulfilled).unwrap();

        assert_eq!(store.next_pending(9).unwrap().id, second.id);
    }

    #[test]
    fn expired_pending_ignores_terminal_states() {
        let store = store();
        store.insert(1, 9, at(1), at(2));
        let cancelled = store.insert(2, 9, at(1), at(2));

        let mut cancelled = cancelled;
        cancelled.status = ReservationStatus::Cancelled;
        store.update(&cancelled).unwrap();

        assert_eq!(store.expired_pending(at(3)).len(), 1);
    }
}
