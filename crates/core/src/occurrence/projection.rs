//! Occurrence projection
//!
//! Formats occurrence spans for consumers. Timed spans are converted into the
//! target zone; all-day spans are printed as dates with the inclusive
//! last-day convention described on [`all_day_end`].

use agendum_domain::constants::{DATE_FORMAT, DATE_TIME_FORMAT};
use agendum_domain::Result;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;

use super::recurrence::OccurrenceSpan;
use super::time::parse_zone;

/// Formatted start and end of one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedSpan {
    pub start: String,
    pub end: String,
}

/// Projects spans into a target timezone.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceProjector {
    target: Tz,
}

impl OccurrenceProjector {
    /// Projector for an IANA zone id; unknown ids are a `Projection` error.
    pub fn new(target_tzid: &str) -> Result<Self> {
        parse_zone(target_tzid).map(Self::for_zone)
    }

    #[must_use]
    pub const fn for_zone(target: Tz) -> Self {
        Self { target }
    }

    #[must_use]
    pub const fn target(&self) -> Tz {
        self.target
    }

    #[must_use]
    pub fn project(&self, span: OccurrenceSpan, all_day: bool) -> ProjectedSpan {
        if all_day {
            let start = span.start.naive_utc();
            return ProjectedSpan {
                start: start.date().format(DATE_FORMAT).to_string(),
                end: all_day_end(start, span.end.naive_utc()).format(DATE_FORMAT).to_string(),
            };
        }

        ProjectedSpan {
            start: span.start.with_timezone(&self.target).format(DATE_TIME_FORMAT).to_string(),
            end: span.end.with_timezone(&self.target).format(DATE_TIME_FORMAT).to_string(),
        }
    }
}

/// Last day of an all-day span whose stored end is exclusive.
///
/// One minute is taken off the raw end, then whole days are added back until
/// the result lies strictly after the start. The date of that instant is the
/// inclusive last day. Consumers depend on this exact rule: a one-day event
/// (10th to 11th) ends on the 10th, and a zero-length one rolls forward to
/// the start date plus one.
///
/// At the edges of the supported range the start date is returned.
#[must_use]
pub fn all_day_end(start: NaiveDateTime, raw_end: NaiveDateTime) -> NaiveDate {
    let Some(end) = raw_end.checked_sub_signed(TimeDelta::minutes(1)) else {
        return start.date();
    };
    if start < end {
        return end.date();
    }
    // smallest k with end + k days > start
    let days = (start - end).num_days() + 1;
    TimeDelta::try_days(days)
        .and_then(|days| end.checked_add_signed(days))
        .map_or_else(|| start.date(), |end| end.date())
}
