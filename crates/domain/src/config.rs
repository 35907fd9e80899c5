//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FAN_OUT_LIMIT, DEFAULT_ITEM_TIMEOUT_MS, DEFAULT_LOG_LEVEL, DEFAULT_MAX_OCCURRENCES,
    DEFAULT_TIMEZONE,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Period query pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum number of calendars fetched (and objects expanded) at once.
    pub fan_out_limit: usize,
    /// Timeout applied to each backend call and each object expansion.
    pub item_timeout_ms: u64,
    /// Hard cap on occurrences generated for a single recurring event.
    pub max_occurrences: u16,
    /// Zone used when a caller does not name one.
    pub default_timezone: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            fan_out_limit: DEFAULT_FAN_OUT_LIMIT,
            item_timeout_ms: DEFAULT_ITEM_TIMEOUT_MS,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

impl QueryConfig {
    /// Per-item timeout as a [`std::time::Duration`].
    #[must_use]
    pub const fn item_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.item_timeout_ms)
    }
}
