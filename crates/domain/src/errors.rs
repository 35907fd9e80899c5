//! Error types used throughout the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::NOT_IMPLEMENTED_CODE;

/// Main error type for Agendum
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AgendumError {
    /// No registered backend owns the requested calendar or backend id.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// An optional operation was invoked on a backend that did not declare it.
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    #[error("Malformed calendar object: {0}")]
    MalformedCalendarObject(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Projection error: {0}")]
    Projection(String),

    /// A backend call returned an error of its own.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgendumError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::UnsupportedCapability(_) => "unsupported_capability",
            Self::MalformedCalendarObject(_) => "malformed_calendar_object",
            Self::Recurrence(_) => "recurrence",
            Self::Projection(_) => "projection",
            Self::Backend(_) => "backend",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    /// Numeric code for callers that still speak the legacy backend protocol.
    ///
    /// Only `UnsupportedCapability` has a dedicated code; everything else maps
    /// to `-1`.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::UnsupportedCapability(_) => NOT_IMPLEMENTED_CODE,
            _ => -1,
        }
    }
}

/// Result type alias for Agendum operations
pub type Result<T> = std::result::Result<T, AgendumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_capability_uses_not_implemented_code() {
        let err = AgendumError::UnsupportedCapability("get_in_period".into());
        assert_eq!(err.code(), -501);
        assert_eq!(AgendumError::Internal("x".into()).code(), -1);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let err = AgendumError::Projection("unknown timezone Mars/Olympus".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Projection");
        assert_eq!(json["message"], "unknown timezone Mars/Olympus");
    }
}
