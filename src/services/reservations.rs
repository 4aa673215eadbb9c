//! Reservation management service

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        patron::Role,
        reservation::{Reservation, ReservationStatus},
    },
    rules::BusinessRules,
    store::Store,
};

#[derive(Clone)]
pub struct ReservationsService {
    store: Store,
    rules: BusinessRules,
    clock: Arc<dyn Clock>,
    lock_wait: StdDuration,
}

impl ReservationsService {
    pub fn new(
        store: Store,
        rules: BusinessRules,
        clock: Arc<dyn Clock>,
        lock_wait: StdDuration,
    ) -> Self {
        Self {
            store,
            rules,
            clock,
            lock_wait,
        }
    }

    /// Explicitly reserve an out-of-stock item.
    ///
    /// Reservations exist for items with no copies on the shelf; when a
    /// copy is available the caller should borrow directly instead.
    pub async fn create_reservation(&self, patron_id: i64, item_id: i64) -> AppResult<Reservation> {
        self.store.patrons.get(patron_id)?;
        self.store.items.get(item_id)?;

        let _guard = self.store.lock_item(item_id, self.lock_wait).await?;

        let item = self.store.items.get(item_id)?;
        if item.available > 0 {
            return Err(AppError::InvalidState(
                "the item has copies available; borrow it directly instead of reserving"
                    .to_string(),
            ));
        }

        if self
            .store
            .reservations
            .pending_for(patron_id, item_id)
            .is_some()
        {
            return Err(AppError::AlreadyExists {
                entity: "Reservation",
                detail: format!(
                    "patron {} already holds a pending reservation for item {}",
                    patron_id, item_id
                ),
            });
        }

        let now = self.clock.now();
        let reservation = self.store.reservations.insert(
            patron_id,
            item_id,
            now,
            now + self.rules.reservation_validity(),
        );

        tracing::info!(
            reservation_id = reservation.id,
            patron_id,
            item_id,
            expires_at = %reservation.expires_at,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Cancel a pending reservation. Only the owner or an admin may cancel.
    pub async fn cancel_reservation(
        &self,
        reservation_id: i64,
        acting_patron_id: i64,
    ) -> AppResult<()> {
        let acting = self.store.patrons.get(acting_patron_id)?;
        let reservation = self.store.reservations.get(reservation_id)?;

        if reservation.patron_id != acting.id && acting.role != Role::Admin {
            return Err(AppError::AccessDenied(
                "you can only cancel your own reservations".to_string(),
            ));
        }

        let _guard = self
            .store
            .lock_item(reservation.item_id, self.lock_wait)
            .await?;

        // Re-read under the lock; a concurrent promotion or sweep may have
        // moved it out of the queue already
        let mut reservation = self.store.reservations.get(reservation_id)?;
        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "reservation is {} and can no longer be cancelled",
                reservation.status
            )));
        }

        reservation.status = ReservationStatus::Cancelled;
        self.store.reservations.update(&reservation)?;

        tracing::info!(reservation_id, patron_id = acting.id, "reservation cancelled");
        Ok(())
    }

    /// All reservations for a patron, newest first
    pub fn reservations_for_patron(&self, patron_id: i64) -> AppResult<Vec<Reservation>> {
        self.store.patrons.get(patron_id)?;
        Ok(self.store.reservations.for_patron(patron_id))
    }

    /// Cancel every pending reservation whose validity window has passed.
    ///
    /// Each row transitions under its own item lock and commits
    /// independently, so the sweep may be interrupted mid-batch and re-run
    /// safely. Returns the number of reservations cancelled.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let expired = self.store.reservations.expired_pending(now);

        let mut count = 0;
        for candidate in expired {
            let guard = match self
                .store
                .lock_item(candidate.item_id, self.lock_wait)
                .await
            {
                Ok(guard) => guard,
                Err(_) => {
                    tracing::warn!(
                        reservation_id = candidate.id,
                        item_id = candidate.item_id,
                        "item busy, leaving expired reservation for the next sweep"
                    );
                    continue;
                }
            };

            // Re-read under the lock; only still-pending rows are touched
            let Ok(mut reservation) = self.store.reservations.get(candidate.id) else {
                continue;
            };
            if reservation.status != ReservationStatus::Pending {
                continue;
            }
            reservation.status = ReservationStatus::Cancelled;
            if self.store.reservations.update(&reservation).is_ok() {
                count += 1;
            }
            drop(guard);
        }

        if count > 0 {
            tracing::info!(count, "expired reservations cancelled");
        }
        count
    }
}
