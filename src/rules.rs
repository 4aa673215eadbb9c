//! Circulation business rules
//!
//! Pure, table-driven rules: loan limits and durations per role, penalty
//! arithmetic for late returns, and the reservation validity window. The
//! role table is a closed enum match kept as data; the monetary amounts
//! come from [`RulesConfig`].

use chrono::Duration;
use rust_decimal::Decimal;

use crate::{config::RulesConfig, models::patron::Role};

/// Maximum concurrent open loans per role
pub const MAX_LOANS_STUDENT: u32 = 3;
pub const MAX_LOANS_LIBRARIAN: u32 = 5;
pub const MAX_LOANS_ADMIN: u32 = 5;

/// Loan duration in days per role
pub const LOAN_DAYS_STUDENT: i64 = 14;
pub const LOAN_DAYS_LIBRARIAN: i64 = 30;
pub const LOAN_DAYS_ADMIN: i64 = 30;

#[derive(Debug, Clone)]
pub struct BusinessRules {
    unit_penalty: Decimal,
    penalty_ceiling: Decimal,
    reservation_validity: Duration,
}

impl BusinessRules {
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            unit_penalty: Decimal::from(config.unit_penalty),
            penalty_ceiling: Decimal::from(config.penalty_ceiling),
            reservation_validity: Duration::hours(config.reservation_validity_hours),
        }
    }

    /// Maximum number of open (active or overdue) loans for a role
    pub fn max_loans(role: Role) -> u32 {
        match role {
            Role::Student => MAX_LOANS_STUDENT,
            Role::Librarian => MAX_LOANS_LIBRARIAN,
            Role::Admin => MAX_LOANS_ADMIN,
        }
    }

    /// Loan duration for a role
    pub fn loan_duration(role: Role) -> Duration {
        match role {
            Role::Student => Duration::days(LOAN_DAYS_STUDENT),
            Role::Librarian => Duration::days(LOAN_DAYS_LIBRARIAN),
            Role::Admin => Duration::days(LOAN_DAYS_ADMIN),
        }
    }

    /// Penalty for a return that is `days_late` whole days past due.
    /// Zero when on time or early.
    pub fn penalty(&self, days_late: i64) -> Decimal {
        if days_late <= 0 {
            return Decimal::ZERO;
        }
        self.unit_penalty * Decimal::from(days_late)
    }

    /// A patron is blocked once their summed unpaid penalties strictly
    /// exceed the ceiling.
    pub fn blocks_borrowing(&self, total_penalties: Decimal) -> bool {
        total_penalties > self.penalty_ceiling
    }

    pub fn penalty_ceiling(&self) -> Decimal {
        self.penalty_ceiling
    }

    /// How long a newly created reservation stays valid
    pub fn reservation_validity(&self) -> Duration {
        self.reservation_validity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> BusinessRules {
        BusinessRules::from_config(&RulesConfig::default())
    }

    #[test]
    fn role_table() {
        assert_eq!(BusinessRules::max_loans(Role::Student), 3);
        assert_eq!(BusinessRules::max_loans(Role::Librarian), 5);
        assert_eq!(BusinessRules::max_loans(Role::Admin), 5);
        assert_eq!(BusinessRules::loan_duration(Role::Student), Duration::days(14));
        assert_eq!(BusinessRules::loan_duration(Role::Librarian), Duration::days(30));
        assert_eq!(BusinessRules::loan_duration(Role::Admin), Duration::days(30));
    }

    #[test]
    fn penalty_is_zero_when_on_time() {
        assert_eq!(rules().penalty(0), Decimal::ZERO);
        assert_eq!(rules().penalty(-3), Decimal::ZERO);
    }

    #[test]
    fn penalty_scales_per_day() {
        assert_eq!(rules().penalty(1), Decimal::from(1000));
        assert_eq!(rules().penalty(5), Decimal::from(5000));
    }

    #[test]
    fn ceiling_blocks_strictly_above() {
        let rules = rules();
        assert!(!rules.blocks_borrowing(Decimal::from(10000)));
        assert!(rules.blocks_borrowing(Decimal::from(10001)));
        assert!(rules.blocks_borrowing(Decimal::from(15000)));
    }

    #[test]
    fn reservation_validity_from_config() {
        assert_eq!(rules().reservation_validity(), Duration::hours(48));
    }
}
