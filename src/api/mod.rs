//! HTTP API handlers
//!
//! Thin axum handlers over the service layer. Error kinds map to transport
//! signals in `crate::error`; the handlers themselves only translate
//! request bodies into service calls.

pub mod health;
pub mod loans;
pub mod maintenance;
pub mod openapi;
pub mod reservations;
