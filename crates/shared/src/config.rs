//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Payment schedule constants.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Retry policy for trigger-source write-backs.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Timeouts for outbound collaborator calls.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
}

/// Payment schedule constants.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScheduleConfig {
    /// Minimum number of days to the target close date for a split schedule.
    #[serde(default = "default_split_threshold_days")]
    pub split_threshold_days: i64,
    /// Payment term in days, counted from the issue date.
    #[serde(default = "default_payment_term_days")]
    pub payment_term_days: i64,
}

fn default_split_threshold_days() -> i64 {
    30
}

fn default_payment_term_days() -> i64 {
    3
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            split_threshold_days: default_split_threshold_days(),
            payment_term_days: default_payment_term_days(),
        }
    }
}

/// Retry policy configuration for write-backs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts before surfacing the failure.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds; attempt N waits N times this.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Timeouts for outbound collaborator calls.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds. Exceeding it counts as transient.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BILLFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
