//! Backend and calendar identities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::CALENDAR_ID_SEPARATOR;
use crate::errors::AgendumError;

/// Identifier of a calendar object inside its calendar.
pub type ObjectId = i64;

/// Identifier of a registered backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Calendar identity: the owning backend plus the backend-local uri.
///
/// Rendered as `<backend>::<uri>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarId {
    pub backend: BackendId,
    pub uri: String,
}

impl CalendarId {
    #[must_use]
    pub fn new(backend: impl Into<BackendId>, uri: impl Into<String>) -> Self {
        Self { backend: backend.into(), uri: uri.into() }
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.backend, CALENDAR_ID_SEPARATOR, self.uri)
    }
}

impl FromStr for CalendarId {
    type Err = AgendumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(CALENDAR_ID_SEPARATOR) {
            Some((backend, uri)) if !backend.is_empty() && !uri.is_empty() => {
                Ok(Self::new(backend, uri))
            }
            _ => Err(AgendumError::InvalidInput(format!(
                "calendar id '{s}' is not of the form <backend>{CALENDAR_ID_SEPARATOR}<uri>"
            ))),
        }
    }
}

/// Calendar metadata as reported by a backend listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDescriptor {
    pub id: CalendarId,
    pub display_name: String,
    pub owner: String,
    pub writable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_id_round_trips_through_display() {
        let id = CalendarId::new("local", "work");
        assert_eq!(id.to_string(), "local::work");
        assert_eq!("local::work".parse::<CalendarId>().unwrap(), id);
    }

    #[test]
    fn test_calendar_id_keeps_separator_in_uri() {
        let id: CalendarId = "dav::team::shared".parse().unwrap();
        assert_eq!(id.backend.as_str(), "dav");
        assert_eq!(id.uri, "team::shared");
    }

    #[test]
    fn test_calendar_id_rejects_missing_parts() {
        for raw in ["work", "::work", "local::"] {
            assert!(raw.parse::<CalendarId>().is_err(), "{raw} should be rejected");
        }
    }
}
