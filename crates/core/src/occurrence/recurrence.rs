//! Recurrence expansion
//!
//! Turns one [`EventDefinition`] into the `(start, end)` spans that overlap a
//! [`Period`]. RRULE iteration is delegated to the `rrule` crate and bounded
//! by the period end, the rule's own COUNT/UNTIL and a hard occurrence cap.
//! RDATE and EXDATE are applied here so RDATE PERIOD values can carry their
//! own end.

use std::collections::HashSet;

use agendum_domain::constants::DEFAULT_MAX_OCCURRENCES;
use agendum_domain::{AgendumError, EventDefinition, EventTime, Period, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;
use tracing::warn;

use super::time::{parse_zone, resolve_local, to_instant};

const RFC5545_DATE_TIME: &str = "%Y%m%dT%H%M%S";
const RFC5545_DATE: &str = "%Y%m%d";

/// One occurrence as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OccurrenceSpan {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Expands events into occurrence spans.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceExpander {
    max_occurrences: u16,
}

impl Default for RecurrenceExpander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OCCURRENCES)
    }
}

impl RecurrenceExpander {
    #[must_use]
    pub const fn new(max_occurrences: u16) -> Self {
        Self { max_occurrences }
    }

    /// Spans of `event` overlapping `period`, ascending by start.
    ///
    /// Spans are kept or dropped whole; nothing is clipped to the period.
    pub fn expand(&self, event: &EventDefinition, period: &Period) -> Result<Vec<OccurrenceSpan>> {
        let base = base_span(event)?;

        if !event.is_recurring() {
            return Ok(if period.overlaps(base.start, base.end) { vec![base] } else { Vec::new() });
        }

        let duration = base.end - base.start;
        let excluded: HashSet<DateTime<Utc>> =
            event.recurrence.exdates.iter().map(to_instant).collect::<Result<_>>()?;

        // RDATE entries go first so an explicit PERIOD end wins over a rule
        // instance starting at the same instant.
        let mut spans = Vec::new();
        for rdate in &event.recurrence.dates {
            let start = to_instant(&rdate.start)?;
            let end = match &rdate.end {
                Some(end) => to_instant(end)?,
                None => offset(start, duration)?,
            };
            if end < start {
                return Err(AgendumError::Recurrence(format!(
                    "RDATE period ends at {end} before it starts at {start}"
                )));
            }
            spans.push(OccurrenceSpan::new(start, end));
        }

        match &event.recurrence.rule {
            Some(rule) => {
                for start in self.rule_starts(&event.start, rule, duration, period)? {
                    spans.push(OccurrenceSpan::new(start, offset(start, duration)?));
                }
            }
            // DTSTART is always the first instance of a recurrence set.
            None => spans.push(base),
        }

        spans.retain(|span| !excluded.contains(&span.start) && period.overlaps(span.start, span.end));
        spans.sort_by_key(|span| span.start);
        spans.dedup_by_key(|span| span.start);
        Ok(spans)
    }

    fn rule_starts(
        &self,
        dtstart: &EventTime,
        rule: &str,
        duration: TimeDelta,
        period: &Period,
    ) -> Result<Vec<DateTime<Utc>>> {
        let source = rule_source(dtstart, rule)?;
        let set: RRuleSet = source
            .parse()
            .map_err(|err| AgendumError::Recurrence(format!("invalid rule '{rule}': {err}")))?;

        // An instance starting up to `duration` before the period can still
        // overlap it.
        let after = period
            .start()
            .checked_sub_signed(duration + TimeDelta::seconds(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .with_timezone(&rrule::Tz::UTC);
        let before = period.end().with_timezone(&rrule::Tz::UTC);
        let result = set.after(after).before(before).all(self.max_occurrences);

        if result.limited {
            warn!(
                rule,
                max_occurrences = self.max_occurrences,
                "recurrence expansion hit the occurrence cap; later instances are omitted"
            );
        }

        Ok(result.dates.into_iter().map(|date| date.with_timezone(&Utc)).collect())
    }
}

/// The event's own span. DTEND defaults to one day after a DATE start and to
/// the start itself otherwise.
fn base_span(event: &EventDefinition) -> Result<OccurrenceSpan> {
    let start = to_instant(&event.start)?;
    let end = match &event.end {
        Some(end) => to_instant(end)?,
        None if event.is_all_day() => start.checked_add_signed(TimeDelta::days(1)).ok_or_else(|| {
            AgendumError::MalformedCalendarObject(format!("all-day event at {start} has no following day"))
        })?,
        None => start,
    };

    if end < start {
        return Err(AgendumError::MalformedCalendarObject(format!(
            "event ends at {end} before it starts at {start}"
        )));
    }
    Ok(OccurrenceSpan::new(start, end))
}

/// `start + duration`, failing with `Recurrence` outside the supported range.
fn offset(start: DateTime<Utc>, duration: TimeDelta) -> Result<DateTime<Utc>> {
    start.checked_add_signed(duration).ok_or_else(|| {
        AgendumError::Recurrence(format!("occurrence at {start} lasting {duration} ends out of range"))
    })
}

/// RFC 5545 text understood by the rule engine.
///
/// Dates and floating times are anchored in UTC, consistent with
/// [`to_instant`].
fn rule_source(dtstart: &EventTime, rule: &str) -> Result<String> {
    let (line, zone) = match dtstart {
        EventTime::Date { date } => {
            (format!("DTSTART:{}T000000Z", date.format(RFC5545_DATE)), None)
        }
        EventTime::Floating { local } => {
            (format!("DTSTART:{}Z", local.format(RFC5545_DATE_TIME)), None)
        }
        EventTime::Utc { instant } => {
            (format!("DTSTART:{}Z", instant.format(RFC5545_DATE_TIME)), None)
        }
        EventTime::Zoned { local, tzid } => {
            let zone = parse_zone(tzid)?;
            (format!("DTSTART;TZID={tzid}:{}", local.format(RFC5545_DATE_TIME)), Some(zone))
        }
    };

    let rule = rule.trim();
    let rule = rule.strip_prefix("RRULE:").unwrap_or(rule);
    let parts = rule
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                normalize_until(value, zone).map(|until| format!("UNTIL={until}"))
            }
            _ => Ok(part.to_string()),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!("{line}\nRRULE:{}", parts.join(";")))
}

/// Rewrite UNTIL as a UTC date-time, which the rule engine requires whenever
/// DTSTART is UTC or zoned. A DATE value covers its whole day.
fn normalize_until(value: &str, zone: Option<Tz>) -> Result<String> {
    if value.ends_with('Z') || value.ends_with('z') {
        return Ok(value.to_ascii_uppercase());
    }

    let local = if value.len() == 8 {
        NaiveDate::parse_from_str(value, RFC5545_DATE)
            .map(|date| date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)))
    } else {
        NaiveDateTime::parse_from_str(value, RFC5545_DATE_TIME)
    }
    .map_err(|err| AgendumError::Recurrence(format!("invalid UNTIL '{value}': {err}")))?;

    let instant = match zone {
        Some(zone) => resolve_local(local, zone)?,
        None => local.and_utc(),
    };
    Ok(format!("{}Z", instant.format(RFC5545_DATE_TIME)))
}
