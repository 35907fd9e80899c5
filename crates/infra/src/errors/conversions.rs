//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use agendum_domain::AgendumError;
use chrono::ParseError as ChronoParseError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;
use tracing_subscriber::util::TryInitError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AgendumError);

impl From<InfraError> for AgendumError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AgendumError> for InfraError {
    fn from(value: AgendumError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAgendumError {
    fn into_agendum(self) -> AgendumError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → AgendumError */
/* -------------------------------------------------------------------------- */

impl IntoAgendumError for IoError {
    fn into_agendum(self) -> AgendumError {
        match self.kind() {
            ErrorKind::NotFound => AgendumError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                AgendumError::Config(format!("permission denied: {self}"))
            }
            ErrorKind::InvalidData => AgendumError::InvalidInput(format!("invalid data: {self}")),
            _ => AgendumError::Internal(format!("i/o failure: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_agendum())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error / toml::de::Error → AgendumError */
/* -------------------------------------------------------------------------- */

impl IntoAgendumError for JsonError {
    fn into_agendum(self) -> AgendumError {
        AgendumError::Config(format!(
            "Invalid JSON format at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_agendum())
    }
}

impl IntoAgendumError for TomlError {
    fn into_agendum(self) -> AgendumError {
        AgendumError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_agendum())
    }
}

/* -------------------------------------------------------------------------- */
/* chrono::ParseError → AgendumError */
/* -------------------------------------------------------------------------- */

impl IntoAgendumError for ChronoParseError {
    fn into_agendum(self) -> AgendumError {
        AgendumError::MalformedCalendarObject(format!("invalid date or time value: {self}"))
    }
}

impl From<ChronoParseError> for InfraError {
    fn from(value: ChronoParseError) -> Self {
        InfraError(value.into_agendum())
    }
}

/* -------------------------------------------------------------------------- */
/* tracing_subscriber::util::TryInitError → AgendumError */
/* -------------------------------------------------------------------------- */

impl IntoAgendumError for TryInitError {
    fn into_agendum(self) -> AgendumError {
        AgendumError::Config(format!("tracing subscriber already installed: {self}"))
    }
}

impl From<TryInitError> for InfraError {
    fn from(value: TryInitError) -> Self {
        InfraError(value.into_agendum())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
