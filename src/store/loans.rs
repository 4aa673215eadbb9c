//! Loan store
//!
//! Loans are retained for history and never deleted; patron and item
//! navigation happens through explicit query methods rather than live
//! object graphs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanStatus},
    store::IdGenerator,
};

#[derive(Clone)]
pub struct LoanStore {
    records: Arc<RwLock<HashMap<i64, Loan>>>,
    ids: IdGenerator,
}

impl LoanStore {
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
        borrowed_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> Loan {
        let loan = Loan {
            id: self.ids.next_id(),
            patron_id,
            item_id,
            borrowed_at,
            due_at,
            returned_at: None,
            status: LoanStatus::Active,
            penalty: Decimal::ZERO,
        };
        self.records.write().unwrap().insert(loan.id, loan.clone());
        loan
    }

    pub fn get(&self, id: i64) -> AppResult<Loan> {
        self.records
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound {
                entity: "Loan",
                key: id,
            })
    }

    /// Replace a loan record in full
    pub fn update(&self, loan: &Loan) -> AppResult<()> {
        let mut records = self.records.write().unwrap();
        match records.get_mut(&loan.id) {
            Some(existing) => {
                *existing = loan.clone();
                Ok(())
            }
            None => Err(AppError::NotFound {
                entity: "Loan",
                key: loan.id,
            }),
        }
    }

    /// All loans for a patron, oldest first
    pub fn for_patron(&self, patron_id: i64) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|l| l.patron_id == patron_id)
            .cloned()
            .collect();
        loans.sort_by_key(|l| (l.borrowed_at, l.id));
        loans
    }

    /// Number of open (active or overdue) loans held by a patron
    pub fn count_open_for_patron(&self, patron_id: i64) -> u32 {
        self.records
            .read()
            .unwrap()
            .values()
            .filter(|l| l.patron_id == patron_id && l.status.is_open())
            .count() as u32
    }

    /// Summed penalties recorded against a patron. Penalties carry no paid
    /// flag, so the full historical sum counts as unpaid.
    pub fn sum_penalties(&self, patron_id: i64) -> Decimal {
        self.records
            .read()
            .unwrap()
            .values()
            .filter(|l| l.patron_id == patron_id)
            .map(|l| l.penalty)
            .sum()
    }

    /// Active loans whose due date has passed, candidates for the overdue sweep
    pub fn active_due_before(&self, cutoff: DateTime<Utc>) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|l| l.status == LoanStatus::Active && l.due_at < cutoff)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.id);
        loans
    }

    /// Active loans due within a forward window, candidates for reminders
    pub fn active_due_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|l| l.status == LoanStatus::Active && l.due_at >= from && l.due_at < to)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.id);
        loans
    }

    /// All loans currently marked overdue, oldest due date first
    pub fn overdue(&self) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|l| l.status == LoanStatus::Overdue)
            .cloned()
            .collect();
        loans.sort_by_key(|l| (l.due_at, l.id));
        loans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> LoanStore {
        LoanStore::new(IdGenerator::new(0))
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn open_count_ignores_closed_loans() {
        let store = store();
        let a = store.insert(7, 1, at(1), at(15));
        store.insert(7, 2, at(2), at(16));

        assert_eq!(store.count_open_for_patron(7), 2);

        let mut closed = a;
        closed.status = LoanStatus::Closed;
        closed.returned_at = Some(at(3));
        store.update(&closed).unwrap();

        assert_eq!(store.count_open_for_patron(7), 1);
    }

    #[test]
    fn overdue_counts_against_the_limit() {
        let store = store();
        let loan = store.insert(7, 1, at(1), at(2));
        let mut overdue = loan;
        overdue.status = LoanStatus::Overdue;
        store.update(&overdue).unwrap();

        assert_eq!(store.count_open_for_patron(7), 1);
    }

    #[test]
    fn penalties_sum_across_loans() {
        let store = store();
        let a = store.insert(7, 1, at(1), at(2));
        let b = store.insert(7, 2, at(1), at(2));

        let mut a = a;
        a.penalty = Decimal::from(3000);
        store.update(&a).unwrap();
        let mut b = b;
        b.penalty = Decimal::from(2000);
        store.update(&b).unwrap();

        assert_eq!(store.sum_penalties(7), Decimal::from(5000));
        assert_eq!(store.sum_penalties(8), Decimal::ZERO);
    }

    #[test]
    fn due_window_queries_are_half_open() {
        let store = store();
        store.insert(7, 1, at(1), at(10));
        store.insert(7, 2, at(1), at(11));
        store.insert(7, 3, at(1), at(12));

        let due = store.active_due_between(at(10), at(12));
        assert_eq!(due.len(), 2);
        assert!(store.active_due_before(at(11)).len() == 1);
    }
}
