//! Application constants
//!
//! Centralized location for domain-level constants shared by the core and
//! infrastructure crates.

/// Error code reported for operations a backend does not implement.
pub const NOT_IMPLEMENTED_CODE: i32 = -501;

// Occurrence defaults
pub const DEFAULT_EVENT_TITLE: &str = "unnamed";
pub const DEFAULT_EVENT_DESCRIPTION: &str = "";

// Calendar envelope used when a record only carries a parsed event
pub const CALENDAR_PRODID: &str = "-//Agendum//Internal iCal System//EN";
pub const CALENDAR_VERSION: &str = "2.0";

// Output formats
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Separator between backend id and calendar uri in a calendar id
pub const CALENDAR_ID_SEPARATOR: &str = "::";

// Query defaults
pub const DEFAULT_FAN_OUT_LIMIT: usize = 4;
pub const DEFAULT_ITEM_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_OCCURRENCES: u16 = 1_000;
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_LOG_LEVEL: &str = "info";
