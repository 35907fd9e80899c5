//! Resolution of event time values to absolute instants

use agendum_domain::{AgendumError, EventTime, Result};
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Look up an IANA zone id.
pub fn parse_zone(tzid: &str) -> Result<Tz> {
    tzid.parse::<Tz>()
        .map_err(|_| AgendumError::Projection(format!("unknown timezone identifier '{tzid}'")))
}

/// Resolve a local wall-clock time in `zone`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// spring-forward gap are shifted by one hour, matching RFC 5545 §3.3.5.
pub fn resolve_local(local: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            let shifted = local.checked_add_signed(TimeDelta::hours(1))?;
            zone.from_local_datetime(&shifted).earliest()
        })
        .map(|resolved| resolved.with_timezone(&Utc))
        .ok_or_else(|| {
            AgendumError::Projection(format!("local time {local} does not exist in {zone}"))
        })
}

/// Absolute instant of an event time value.
///
/// Dates resolve to midnight UTC and floating times are read as UTC; both
/// are timezone-agnostic and never converted for display.
pub fn to_instant(value: &EventTime) -> Result<DateTime<Utc>> {
    match value {
        EventTime::Date { date } => Ok(date.and_time(NaiveTime::MIN).and_utc()),
        EventTime::Floating { local } => Ok(local.and_utc()),
        EventTime::Utc { instant } => Ok(*instant),
        EventTime::Zoned { local, tzid } => resolve_local(*local, parse_zone(tzid)?),
    }
}
