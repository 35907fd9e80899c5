//! Property value types (RFC 5545 §3.3)

use agendum_domain::{AgendumError, EventTime, RecurrenceDate, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::errors::InfraError;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

fn malformed(message: String) -> AgendumError {
    AgendumError::MalformedCalendarObject(message)
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(InfraError::from)?)
}

/// A DATE-TIME value: `...Z` is UTC, otherwise zoned when `tzid` is given
/// and floating when not.
pub fn parse_date_time(value: &str, tzid: Option<&str>) -> Result<EventTime> {
    if let Some(utc) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        let local = NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT).map_err(InfraError::from)?;
        return Ok(EventTime::utc(local.and_utc()));
    }

    let local = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(InfraError::from)?;
    Ok(match tzid {
        Some(tzid) => EventTime::zoned(local, tzid),
        None => EventTime::Floating { local },
    })
}

/// A DATE or DATE-TIME value, chosen by `VALUE=` or by the value's shape.
pub fn parse_time_value(value: &str, value_type: Option<&str>, tzid: Option<&str>) -> Result<EventTime> {
    let is_date = match value_type {
        Some(kind) => kind.eq_ignore_ascii_case("DATE"),
        None => value.len() == 8,
    };
    if is_date {
        parse_date(value).map(EventTime::date)
    } else {
        parse_date_time(value, tzid)
    }
}

/// A timestamp property such as LAST-MODIFIED; values without `Z` are read
/// as UTC.
pub fn parse_utc_timestamp(value: &str) -> Result<DateTime<Utc>> {
    match parse_date_time(value, None)? {
        EventTime::Utc { instant } => Ok(instant),
        EventTime::Floating { local } => Ok(local.and_utc()),
        other => Err(malformed(format!("unexpected timestamp {other:?}"))),
    }
}

/// `[+-]P[nW][nD][T[nH][nM][nS]]`
///
/// Amounts beyond the representable range are malformed, not clamped.
pub fn parse_duration(value: &str) -> Result<TimeDelta> {
    let invalid = || malformed(format!("invalid duration '{value}'"));

    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix(['P', 'p']).ok_or_else(invalid)?;

    let mut total = TimeDelta::zero();
    let mut digits = String::new();
    let mut in_time = false;
    let mut seen_unit = false;
    for c in rest.chars() {
        match c.to_ascii_uppercase() {
            '0'..='9' => digits.push(c),
            'T' if digits.is_empty() && !in_time => in_time = true,
            unit => {
                let amount: i64 = digits.parse().map_err(|_| invalid())?;
                digits.clear();
                let part = match (unit, in_time) {
                    ('W', false) => TimeDelta::try_weeks(amount),
                    ('D', false) => TimeDelta::try_days(amount),
                    ('H', true) => TimeDelta::try_hours(amount),
                    ('M', true) => TimeDelta::try_minutes(amount),
                    ('S', true) => TimeDelta::try_seconds(amount),
                    _ => return Err(invalid()),
                };
                total = part.and_then(|part| total.checked_add(&part)).ok_or_else(|| {
                    malformed(format!("duration '{value}' is out of range"))
                })?;
                seen_unit = true;
            }
        }
    }
    if !digits.is_empty() || !seen_unit {
        return Err(invalid());
    }

    Ok(if negative { -total } else { total })
}

/// Shift an event time by `delta`, keeping its value type.
///
/// # Errors
/// Returns `MalformedCalendarObject` when the result leaves the supported
/// date range.
pub fn shift(value: &EventTime, delta: TimeDelta) -> Result<EventTime> {
    let shifted = match value {
        EventTime::Date { date } => {
            date.checked_add_signed(TimeDelta::days(delta.num_days())).map(EventTime::date)
        }
        EventTime::Floating { local } => {
            local.checked_add_signed(delta).map(|local| EventTime::Floating { local })
        }
        EventTime::Utc { instant } => instant.checked_add_signed(delta).map(EventTime::utc),
        EventTime::Zoned { local, tzid } => {
            local.checked_add_signed(delta).map(|local| EventTime::zoned(local, tzid.clone()))
        }
    };
    shifted.ok_or_else(|| malformed(format!("shifting {value:?} by {delta} is out of range")))
}

/// A PERIOD value: `start/end` or `start/duration`.
pub fn parse_period(value: &str, tzid: Option<&str>) -> Result<RecurrenceDate> {
    let (start, tail) =
        value.split_once('/').ok_or_else(|| malformed(format!("invalid period '{value}'")))?;
    let start = parse_date_time(start, tzid)?;
    let end = if tail.starts_with(['P', 'p', '+', '-']) {
        shift(&start, parse_duration(tail)?)?
    } else {
        parse_date_time(tail, tzid)?
    };
    Ok(RecurrenceDate { start, end: Some(end) })
}

#[must_use]
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Parameter suffix and value text for an event time, e.g.
/// `(";TZID=Europe/Berlin", "20240301T090000")`.
#[must_use]
pub fn format_time_value(value: &EventTime) -> (String, String) {
    match value {
        EventTime::Date { date } => (";VALUE=DATE".to_string(), date.format(DATE_FORMAT).to_string()),
        EventTime::Floating { local } => (String::new(), local.format(DATE_TIME_FORMAT).to_string()),
        EventTime::Utc { instant } => {
            (String::new(), format!("{}Z", instant.format(DATE_TIME_FORMAT)))
        }
        EventTime::Zoned { local, tzid } => {
            (format!(";TZID={tzid}"), local.format(DATE_TIME_FORMAT).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_date_time_flavours() {
        assert_eq!(
            parse_date_time("20240310T090000Z", None).unwrap(),
            EventTime::utc(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap())
        );
        assert!(matches!(
            parse_date_time("20240310T090000", Some("Europe/Berlin")).unwrap(),
            EventTime::Zoned { ref tzid, .. } if tzid == "Europe/Berlin"
        ));
        assert!(matches!(parse_date_time("20240310T090000", None).unwrap(), EventTime::Floating { .. }));
        assert!(parse_date_time("2024-03-10 09:00", None).is_err());
    }

    #[test]
    fn test_time_value_respects_value_param() {
        assert!(parse_time_value("20240310", None, None).unwrap().is_date());
        assert!(parse_time_value("20240310", Some("DATE"), Some("UTC")).unwrap().is_date());
        assert!(parse_time_value("20240310", Some("DATE-TIME"), None).is_err());
    }

    #[test]
    fn test_duration_forms() {
        assert_eq!(parse_duration("PT1H30M").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("P1D").unwrap(), TimeDelta::days(1));
        assert_eq!(parse_duration("P2W").unwrap(), TimeDelta::weeks(2));
        assert_eq!(parse_duration("-PT15M").unwrap(), TimeDelta::minutes(-15));
        assert_eq!(parse_duration("P1DT12H").unwrap(), TimeDelta::hours(36));
        for bad in ["", "P", "PT", "1H", "PT5", "P1H", "PTXM"] {
            assert!(parse_duration(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_out_of_range_duration_is_malformed() {
        for huge in ["P999999999999D", "P99999999999999W", "PT9223372036854775807S", "P99999999999999999999D"] {
            let err = parse_duration(huge).unwrap_err();
            assert!(matches!(err, AgendumError::MalformedCalendarObject(_)), "{huge} gave {err:?}");
        }
        // each part fits, the sum does not
        assert!(parse_duration("P100000000000DT2562047788015H").is_err());
    }

    #[test]
    fn test_shift_out_of_range_is_malformed() {
        let start = EventTime::utc(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap());
        let err = shift(&start, TimeDelta::days(999_999_999)).unwrap_err();
        assert!(matches!(err, AgendumError::MalformedCalendarObject(_)));
        assert!(parse_period("20240306T140000Z/P99999999D", None).is_err());
        // representable as a duration, not once added to the start
        assert!(shift(&start, parse_duration("P9999999999D").unwrap()).is_err());
    }

    #[test]
    fn test_period_with_end_and_duration() {
        let explicit = parse_period("20240306T140000Z/20240306T170000Z", None).unwrap();
        let by_duration = parse_period("20240306T140000Z/PT3H", None).unwrap();
        assert_eq!(explicit, by_duration);
        assert!(parse_period("20240306T140000Z", None).is_err());
    }

    #[test]
    fn test_text_escaping() {
        let raw = "Lunch; then coffee, maybe\nC:\\temp";
        let escaped = escape_text(raw);
        assert_eq!(escaped, "Lunch\\; then coffee\\, maybe\\nC:\\\\temp");
        assert_eq!(unescape_text(&escaped), raw);
        assert_eq!(unescape_text("line\\Nbreak"), "line\nbreak");
    }

    #[test]
    fn test_shift_keeps_value_type() {
        let date = EventTime::date(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(
            shift(&date, TimeDelta::days(2)).unwrap(),
            EventTime::date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }
}
