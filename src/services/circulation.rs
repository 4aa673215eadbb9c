//! Loan lifecycle service
//!
//! The primary state machine of the circulation engine: borrowing checks
//! penalties, loan limits and availability, and returns restore the counter
//! and promote the reservation queue. Every read-check-mutate sequence runs
//! under the target item's lock; notifications go out only after the lock
//! is released.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanStatus},
        patron::Patron,
        reservation::{Reservation, ReservationStatus},
    },
    rules::BusinessRules,
    services::notifications::{NotificationKind, NotificationSink},
    store::Store,
};

#[derive(Clone)]
pub struct CirculationService {
    store: Store,
    rules: BusinessRules,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
    lock_wait: StdDuration,
}

impl CirculationService {
    pub fn new(
        store: Store,
        rules: BusinessRules,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn NotificationSink>,
        lock_wait: StdDuration,
    ) -> Self {
        Self {
            store,
            rules,
            clock,
            notifier,
            lock_wait,
        }
    }

    /// Borrow an item for a patron.
    ///
    /// When no copy is available the call fails with `BookUnavailable`, but
    /// a pending reservation for the patron is created (or an existing one
    /// reused) as a side effect and its id is carried in the error.
    pub async fn create_loan(&self, patron_id: i64, item_id: i64) -> AppResult<Loan> {
        let patron = self.store.patrons.get(patron_id)?;
        if !patron.active {
            return Err(AppError::InvalidState(
                "patron account is deactivated".to_string(),
            ));
        }
        // Fail NotFound before taking the lock
        self.store.items.get(item_id)?;

        let guard = self.store.lock_item(item_id, self.lock_wait).await?;

        let total_penalties = self.store.loans.sum_penalties(patron_id);
        if self.rules.blocks_borrowing(total_penalties) {
            return Err(AppError::PenaltyBlocked {
                total: total_penalties,
                ceiling: self.rules.penalty_ceiling(),
            });
        }

        let open_loans = self.store.loans.count_open_for_patron(patron_id);
        let max_loans = BusinessRules::max_loans(patron.role);
        if open_loans >= max_loans {
            return Err(AppError::LoanLimitExceeded {
                current: open_loans,
                max: max_loans,
            });
        }

        if !self.store.items.try_decrement(item_id)? {
            let reservation = self.ensure_pending_reservation(patron_id, item_id);
            tracing::info!(
                patron_id,
                item_id,
                reservation_id = reservation.id,
                "borrow refused, no copies available; reservation held"
            );
            return Err(AppError::BookUnavailable {
                message: format!(
                    "No copy available; a reservation was held for you until {}",
                    reservation.expires_at
                ),
                reservation_id: reservation.id,
            });
        }

        let now = self.clock.now();
        let due_at = now + BusinessRules::loan_duration(patron.role);
        let loan = self.store.loans.insert(patron_id, item_id, now, due_at);
        drop(guard);

        tracing::info!(
            loan_id = loan.id,
            patron_id,
            item_id,
            due_at = %loan.due_at,
            "loan created"
        );
        Ok(loan)
    }

    /// Return a loan.
    ///
    /// The acting patron must own the loan or be staff. The penalty is
    /// computed here, once, from the due date; a prior overdue marking does
    /// not change the arithmetic. A freed copy promotes the oldest pending
    /// reservation, whose holder gets a best-effort notification.
    pub async fn return_loan(&self, loan_id: i64, acting_patron_id: i64) -> AppResult<Loan> {
        let acting = self.store.patrons.get(acting_patron_id)?;
        let loan = self.store.loans.get(loan_id)?;

        let guard = self.store.lock_item(loan.item_id, self.lock_wait).await?;

        // Re-read under the lock; a concurrent return may have closed it
        let mut loan = self.store.loans.get(loan_id)?;
        if loan.status == LoanStatus::Closed {
            return Err(AppError::InvalidState(
                "this loan has already been returned".to_string(),
            ));
        }
        if loan.patron_id != acting.id && !acting.role.is_staff() {
            return Err(AppError::AccessDenied(
                "you can only return your own loans".to_string(),
            ));
        }

        let now = self.clock.now();
        let days_late = (now - loan.due_at).num_days();
        loan.returned_at = Some(now);
        loan.penalty = self.rules.penalty(days_late);
        loan.status = LoanStatus::Closed;
        self.store.loans.update(&loan)?;

        self.store.items.increment(loan.item_id)?;

        // The freed copy is earmarked for the promoted patron, so the
        // promotion itself does not touch the availability counter.
        let promoted = match self.store.reservations.next_pending(loan.item_id) {
            Some(mut reservation) => {
                reservation.status = ReservationStatus::Fulfilled;
                self.store.reservations.update(&reservation)?;
                tracing::info!(
                    reservation_id = reservation.id,
                    patron_id = reservation.patron_id,
                    item_id = reservation.item_id,
                    "reservation promoted to fulfilled"
                );
                Some(reservation)
            }
            None => None,
        };
        drop(guard);

        tracing::info!(
            loan_id = loan.id,
            patron_id = loan.patron_id,
            penalty = %loan.penalty,
            "loan returned"
        );

        if let Some(reservation) = promoted {
            self.notify_promoted(&reservation).await;
        }

        Ok(loan)
    }

    /// All loans for a patron
    pub fn loans_for_patron(&self, patron_id: i64) -> AppResult<Vec<Loan>> {
        self.store.patrons.get(patron_id)?;
        Ok(self.store.loans.for_patron(patron_id))
    }

    /// Loans currently marked overdue
    pub fn overdue_loans(&self) -> Vec<Loan> {
        self.store.loans.overdue()
    }

    /// Create, or reuse, the pending reservation backing a refused borrow.
    /// Caller holds the item lock.
    fn ensure_pending_reservation(&self, patron_id: i64, item_id: i64) -> Reservation {
        if let Some(existing) = self.store.reservations.pending_for(patron_id, item_id) {
            return existing;
        }
        let now = self.clock.now();
        self.store
            .reservations
            .insert(patron_id, item_id, now, now + self.rules.reservation_validity())
    }

    /// Best-effort availability notice to a promoted reservation holder.
    /// Delivery failures never fail the return that triggered them.
    async fn notify_promoted(&self, reservation: &Reservation) {
        let recipient: Patron = match self.store.patrons.get(reservation.patron_id) {
            Ok(patron) => patron,
            Err(_) => {
                tracing::error!(
                    reservation_id = reservation.id,
                    patron_id = reservation.patron_id,
                    "promoted reservation holder not found, skipping notification"
                );
                return;
            }
        };
        let payload = format!(
            "A copy of your reserved book is now available. Your reservation ({}) is ready.",
            reservation.id
        );
        if let Err(e) = self
            .notifier
            .notify(NotificationKind::ReservationAvailable, &recipient, &payload)
            .await
        {
            tracing::error!(
                reservation_id = reservation.id,
                "failed to send availability notification: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        config::RulesConfig,
        models::{
            item::NewItem,
            patron::{NewPatron, Role},
        },
        services::notifications::MockNotificationSink,
    };
    use chrono::{TimeZone, Utc};

    fn build_service(notifier: Arc<dyn NotificationSink>) -> (CirculationService, Store) {
        let store = Store::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap());
        let rules = BusinessRules::from_config(&RulesConfig::default());
        let service = CirculationService::new(
            store.clone(),
            rules,
            Arc::new(clock),
            notifier,
            StdDuration::from_millis(100),
        );
        (service, store)
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_return() {
        let mut mock = MockNotificationSink::new();
        mock.expect_notify()
            .times(1)
            .returning(|_, _, _| Err(AppError::Internal("smtp down".to_string())));

        let (service, store) = build_service(Arc::new(mock));
        let item = store
            .items
            .insert(NewItem {
                isbn: "978-2-07-036002-4".to_string(),
                title: "Vol de nuit".to_string(),
                author: "Antoine de Saint-Exupéry".to_string(),
                total_copies: 1,
            })
            .unwrap();
        let holder = store.patrons.insert(NewPatron {
            matricule: "MAT-1".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Martin".to_string(),
            email: "alice@example.org".to_string(),
            role: Role::Student,
        });
        let waiter = store.patrons.insert(NewPatron {
            matricule: "MAT-2".to_string(),
            first_name: "Badia".to_string(),
            last_name: "Diallo".to_string(),
            email: "badia@example.org".to_string(),
            role: Role::Student,
        });

        let loan = service.create_loan(holder.id, item.id).await.unwrap();
        // Queue the waiter behind the only copy
        let refused = service.create_loan(waiter.id, item.id).await;
        assert!(matches!(refused, Err(AppError::BookUnavailable { .. })));

        // The return promotes the waiter; the failed delivery is absorbed
        let returned = service.return_loan(loan.id, holder.id).await.unwrap();
        assert_eq!(returned.status, LoanStatus::Closed);
    }
}
