//! Loan model and status machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Loan lifecycle states.
///
/// `Active -> Closed` on return, `Active -> Overdue` through the scheduled
/// sweep, `Overdue -> Closed` on return. `Closed` is terminal. The overdue
/// transition is informational only: the penalty is computed once, at return
/// time, from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Closed,
}

impl LoanStatus {
    /// Open loans count against the role loan limit
    pub fn is_open(self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Overdue)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Closed => "closed",
        };
        write!(f, "{}", label)
    }
}

/// A borrowing record linking one patron to one item for a bounded period.
/// Patron and item bindings are immutable after creation; loans are kept
/// for history and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub patron_id: i64,
    pub item_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Monetary charge fixed at return time, zero unless returned late
    pub penalty: Decimal,
}
