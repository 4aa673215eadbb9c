//! Configuration management for the Circulate server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Circulation business rules knobs. Role tables (loan limits and
/// durations) are fixed in code; only the monetary amounts and windows
/// are tunable.
#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    /// Penalty charged per whole day of lateness, in currency units
    pub unit_penalty: i64,
    /// Summed unpaid penalties above which a patron is blocked from borrowing
    pub penalty_ceiling: i64,
    /// How long a pending reservation stays valid
    pub reservation_validity_hours: i64,
    /// Bounded wait for a per-item lock before failing with a retryable error
    pub lock_wait_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Interval between expired-reservation sweeps
    pub expire_interval_secs: u64,
    /// Interval between overdue-marking sweeps
    pub overdue_interval_secs: u64,
    /// Interval between due-soon reminder sweeps
    pub reminder_interval_secs: u64,
    /// Reminders cover loans due between now+lead and now+lead+span
    pub reminder_lead_hours: i64,
    pub reminder_span_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_from_name: Option<String>,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix CIRCULATE_)
            .add_source(
                Environment::with_prefix("CIRCULATE")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            unit_penalty: 1000,
            penalty_ceiling: 10000,
            reservation_validity_hours: 48,
            lock_wait_ms: 2000,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            expire_interval_secs: 3600,
            overdue_interval_secs: 86400,
            reminder_interval_secs: 86400,
            reminder_lead_hours: 24,
            reminder_span_hours: 24,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "noreply@circulate.org".to_string(),
            smtp_from_name: Some("Circulate".to_string()),
            smtp_use_tls: true,
        }
    }
}
