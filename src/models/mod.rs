//! Data models for Circulate

pub mod item;
pub mod loan;
pub mod patron;
pub mod reservation;

// Re-export commonly used types
pub use item::{Item, NewItem};
pub use loan::{Loan, LoanStatus};
pub use patron::{NewPatron, Patron, Role};
pub use reservation::{Reservation, ReservationStatus};
