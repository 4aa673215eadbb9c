//! Reservation model and status machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reservation states. `Pending -> Fulfilled` when a return promotes the
/// oldest queue entry; `Pending -> Cancelled` on explicit cancellation or
/// expiry. Fulfilled and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// A patron's claim on the next freed copy of an item. Per item, pending
/// reservations form a FIFO queue ordered by `created_at`; at most one
/// pending reservation exists per (patron, item) pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: i64,
    pub patron_id: i64,
    pub item_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: ReservationStatus,
}
