//! Query window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AgendumError, Result};

/// Half-open window `[start, end)` of absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Period {
    /// Create a period, rejecting windows that end before they start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(AgendumError::InvalidInput(format!(
                "period end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a period from unix seconds, the conventional query encoding.
    pub fn from_unix(start: i64, end: i64) -> Result<Self> {
        let to_instant = |secs: i64| {
            DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                AgendumError::InvalidInput(format!("timestamp {secs} is out of range"))
            })
        };
        Self::new(to_instant(start)?, to_instant(end)?)
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `[start, end)` intersects this period.
    ///
    /// A zero-length span counts as intersecting when its instant lies inside
    /// the period.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start >= end {
            return self.start <= start && start < self.end;
        }
        start < self.end && end > self.start
    }
}
