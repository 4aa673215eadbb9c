//! Circulate Library Circulation Server
//!
//! Tracks circulation of a finite inventory of physical items among
//! registered patrons: lending, returning, penalizing late returns, and
//! queueing demand when an item is out of stock. The core is the
//! lending/reservation concurrency engine; catalog management, user
//! registration and notification delivery are external collaborators.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod rules;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
