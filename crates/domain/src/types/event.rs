//! Parsed event definitions
//!
//! An [`EventDefinition`] is the single VEVENT a calendar object carries,
//! already decoded by a codec. Time values keep their original flavour (date,
//! floating, UTC or zoned) so the core can decide how to resolve them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EVENT_DESCRIPTION, DEFAULT_EVENT_TITLE};

/// A DTSTART/DTEND/RDATE/EXDATE value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventTime {
    /// Calendar date without time of day.
    Date { date: NaiveDate },
    /// Local time with no zone attached.
    Floating { local: NaiveDateTime },
    Utc { instant: DateTime<Utc> },
    /// Local time qualified by an IANA zone id.
    Zoned { local: NaiveDateTime, tzid: String },
}

impl EventTime {
    #[must_use]
    pub const fn date(date: NaiveDate) -> Self {
        Self::Date { date }
    }

    #[must_use]
    pub const fn utc(instant: DateTime<Utc>) -> Self {
        Self::Utc { instant }
    }

    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned { local, tzid: tzid.into() }
    }

    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date { .. })
    }

    /// Zone id when the value is zoned.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Zoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }
}

/// One RDATE entry. `end` is set when the entry was a PERIOD value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceDate {
    pub start: EventTime,
    pub end: Option<EventTime>,
}

/// Recurrence data of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recurrence {
    /// RRULE value, e.g. `FREQ=WEEKLY;COUNT=3`.
    pub rule: Option<String>,
    pub dates: Vec<RecurrenceDate>,
    pub exdates: Vec<EventTime>,
}

impl Recurrence {
    /// No rule and no explicit dates: the event happens exactly once.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rule.is_none() && self.dates.is_empty()
    }
}

/// Parsed VEVENT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub start: EventTime,
    /// DTEND, or DTSTART + DURATION when the source used a duration.
    pub end: Option<EventTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl EventDefinition {
    /// Event with only a start; everything else empty.
    #[must_use]
    pub fn new(start: EventTime) -> Self {
        Self {
            uid: None,
            summary: None,
            description: None,
            last_modified: None,
            start,
            end: None,
            recurrence: Recurrence::default(),
        }
    }

    #[must_use]
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.recurrence.rule = Some(rule.into());
        self
    }

    /// All-day iff DTSTART is a date value.
    #[must_use]
    pub const fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    #[must_use]
    pub fn is_recurring(&self) -> bool {
        !self.recurrence.is_empty()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or(DEFAULT_EVENT_TITLE)
    }

    #[must_use]
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_EVENT_DESCRIPTION)
    }

    /// LAST-MODIFIED as unix seconds, `0` when never recorded.
    #[must_use]
    pub fn last_modified_unix(&self) -> i64 {
        self.last_modified.map_or(0, |instant| instant.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_all_day_follows_start_value_type() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(EventDefinition::new(EventTime::date(day)).is_all_day());

        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        assert!(!EventDefinition::new(EventTime::utc(instant)).is_all_day());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let event = EventDefinition::new(EventTime::utc(instant));
        assert_eq!(event.title(), "unnamed");
        assert_eq!(event.description_or_default(), "");
        assert_eq!(event.last_modified_unix(), 0);
        assert!(!event.is_recurring());
    }

    #[test]
    fn test_rdate_alone_makes_event_recurring() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut event = EventDefinition::new(EventTime::date(day));
        event.recurrence.dates.push(RecurrenceDate { start: EventTime::date(day), end: None });
        assert!(event.is_recurring());
    }
}
