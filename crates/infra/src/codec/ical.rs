//! iCalendar codec
//!
//! Decodes the first VEVENT of a calendar document into an
//! [`EventDefinition`] and encodes events back into VEVENT blocks. Only the
//! properties the occurrence pipeline reads are interpreted; everything else
//! is skipped.

use agendum_core::CalendarCodec;
use agendum_domain::{AgendumError, EventDefinition, EventTime, RecurrenceDate, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use super::lexer::{fold, parse_content_line, split_lines, ContentLine};
use super::values::{
    escape_text, format_time_value, parse_duration, parse_period, parse_time_value,
    parse_utc_timestamp, shift, unescape_text,
};

const VEVENT: &str = "VEVENT";

/// RFC 5545 codec for calendar object text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ICalendarCodec;

impl ICalendarCodec {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CalendarCodec for ICalendarCodec {
    fn parse(&self, text: &str) -> Result<EventDefinition> {
        let lines = first_event(text)?;
        let mut builder = EventBuilder::default();
        for line in &lines {
            builder.apply(line).map_err(|err| with_property(err, &line.name))?;
        }
        builder.finish()
    }

    fn serialize(&self, event: &EventDefinition) -> String {
        let mut lines = vec![format!("BEGIN:{VEVENT}")];

        if let Some(uid) = &event.uid {
            lines.push(format!("UID:{}", escape_text(uid)));
        }
        if let Some(modified) = event.last_modified {
            lines.push(format!("LAST-MODIFIED:{}", modified.format("%Y%m%dT%H%M%SZ")));
        }
        lines.push(time_line("DTSTART", &event.start));
        if let Some(end) = &event.end {
            lines.push(time_line("DTEND", end));
        }
        if let Some(summary) = &event.summary {
            lines.push(format!("SUMMARY:{}", escape_text(summary)));
        }
        if let Some(description) = &event.description {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        if let Some(rule) = &event.recurrence.rule {
            lines.push(format!("RRULE:{}", rule.trim_start_matches("RRULE:")));
        }
        for date in &event.recurrence.dates {
            lines.push(rdate_line(date));
        }
        for exdate in &event.recurrence.exdates {
            lines.push(time_line("EXDATE", exdate));
        }
        lines.push(format!("END:{VEVENT}"));

        lines.iter().map(|line| fold(line) + "\r\n").collect()
    }
}

/// Content lines inside the first top-level VEVENT, nested components
/// (alarms) excluded.
fn first_event(text: &str) -> Result<Vec<ContentLine>> {
    let mut depth = 0usize;
    let mut inside = false;
    let mut properties = Vec::new();

    for raw in split_lines(text) {
        let line = parse_content_line(&raw)?;
        match line.name.as_str() {
            "BEGIN" if inside => depth += 1,
            "BEGIN" if line.value.eq_ignore_ascii_case(VEVENT) => inside = true,
            "END" if inside && depth > 0 => depth -= 1,
            "END" if inside => return Ok(properties),
            _ if inside && depth == 0 => properties.push(line),
            _ => {}
        }
    }

    Err(AgendumError::MalformedCalendarObject(if inside {
        "VEVENT component is not terminated".to_string()
    } else {
        "calendar data holds no VEVENT component".to_string()
    }))
}

fn with_property(err: AgendumError, property: &str) -> AgendumError {
    match err {
        AgendumError::MalformedCalendarObject(message) => {
            AgendumError::MalformedCalendarObject(format!("{property}: {message}"))
        }
        other => other,
    }
}

#[derive(Default)]
struct EventBuilder {
    start: Option<EventTime>,
    end: Option<EventTime>,
    duration: Option<TimeDelta>,
    uid: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    last_modified: Option<DateTime<Utc>>,
    rule: Option<String>,
    dates: Vec<RecurrenceDate>,
    exdates: Vec<EventTime>,
}

impl EventBuilder {
    fn apply(&mut self, line: &ContentLine) -> Result<()> {
        let value_type = line.param("VALUE");
        let tzid = line.param("TZID");

        match line.name.as_str() {
            "DTSTART" => self.start = Some(parse_time_value(&line.value, value_type, tzid)?),
            "DTEND" => self.end = Some(parse_time_value(&line.value, value_type, tzid)?),
            "DURATION" => self.duration = Some(parse_duration(&line.value)?),
            "UID" => self.uid = Some(unescape_text(&line.value)),
            "SUMMARY" => self.summary = Some(unescape_text(&line.value)),
            "DESCRIPTION" => self.description = Some(unescape_text(&line.value)),
            "LAST-MODIFIED" => self.last_modified = Some(parse_utc_timestamp(&line.value)?),
            "RRULE" if self.rule.is_some() => {
                warn!(rule = %line.value, "ignoring additional RRULE");
            }
            "RRULE" => self.rule = Some(line.value.clone()),
            "RDATE" => {
                for value in line.value.split(',') {
                    let date = if value_type.is_some_and(|kind| kind.eq_ignore_ascii_case("PERIOD")) {
                        parse_period(value, tzid)?
                    } else {
                        RecurrenceDate { start: parse_time_value(value, value_type, tzid)?, end: None }
                    };
                    self.dates.push(date);
                }
            }
            "EXDATE" => {
                for value in line.value.split(',') {
                    self.exdates.push(parse_time_value(value, value_type, tzid)?);
                }
            }
            other => debug!(property = other, "skipping uninterpreted property"),
        }
        Ok(())
    }

    fn finish(mut self) -> Result<EventDefinition> {
        let start = self.start.take().ok_or_else(|| {
            AgendumError::MalformedCalendarObject("VEVENT has no DTSTART".to_string())
        })?;
        let end = match (self.end.take(), self.duration) {
            (Some(end), _) => Some(end),
            (None, Some(duration)) => Some(shift(&start, duration)?),
            (None, None) => None,
        };

        let mut event = EventDefinition::new(start);
        event.end = end;
        event.uid = self.uid;
        event.summary = self.summary;
        event.description = self.description;
        event.last_modified = self.last_modified;
        event.recurrence.rule = self.rule;
        event.recurrence.dates = self.dates;
        event.recurrence.exdates = self.exdates;
        Ok(event)
    }
}

fn time_line(name: &str, value: &EventTime) -> String {
    let (params, text) = format_time_value(value);
    format!("{name}{params}:{text}")
}

fn rdate_line(date: &RecurrenceDate) -> String {
    let (params, start) = format_time_value(&date.start);
    match &date.end {
        Some(end) => {
            let (_, end) = format_time_value(end);
            format!("RDATE;VALUE=PERIOD{params}:{start}/{end}")
        }
        None => format!("RDATE{params}:{start}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    const MEETING: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Europe/Berlin\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:meeting-1@example.org\r\n\
DTSTART;TZID=Europe/Berlin:20240304T090000\r\n\
DURATION:PT45M\r\n\
SUMMARY:Planning\\, weekly\r\n\
DESCRIPTION:Agenda:\\n1. Review\r\n\
LAST-MODIFIED:20240201T120000Z\r\n\
RRULE:FREQ=WEEKLY;COUNT=4\r\n\
EXDATE;TZID=Europe/Berlin:20240311T090000\r\n\
RDATE;VALUE=PERIOD:20240320T140000Z/PT2H\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER:-PT10M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_full_event() {
        let event = ICalendarCodec.parse(MEETING).unwrap();
        let local = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap();

        assert_eq!(event.uid.as_deref(), Some("meeting-1@example.org"));
        assert_eq!(event.summary.as_deref(), Some("Planning, weekly"));
        assert_eq!(event.description.as_deref(), Some("Agenda:\n1. Review"));
        assert_eq!(event.start, EventTime::zoned(local, "Europe/Berlin"));
        assert_eq!(event.end, Some(EventTime::zoned(local + TimeDelta::minutes(45), "Europe/Berlin")));
        assert_eq!(event.last_modified_unix(), Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap().timestamp());
        assert_eq!(event.recurrence.rule.as_deref(), Some("FREQ=WEEKLY;COUNT=4"));
        assert_eq!(event.recurrence.exdates.len(), 1);
        assert_eq!(event.recurrence.dates.len(), 1);
        assert!(event.recurrence.dates[0].end.is_some());
        assert!(!event.is_all_day());
    }

    #[test]
    fn test_parse_all_day_event() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART;VALUE=DATE:20240310\nDTEND;VALUE=DATE:20240311\nEND:VEVENT\nEND:VCALENDAR\n";
        let event = ICalendarCodec.parse(text).unwrap();
        assert!(event.is_all_day());
        assert_eq!(event.title(), "unnamed");
        assert_eq!(event.end, Some(EventTime::date(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap())));
    }

    #[test]
    fn test_parse_folded_summary() {
        let text = "BEGIN:VEVENT\r\nDTSTART:20240310T090000Z\r\nSUMMARY:A very long\r\n  title\r\nEND:VEVENT\r\n";
        assert_eq!(ICalendarCodec.parse(text).unwrap().summary.as_deref(), Some("A very long title"));
    }

    #[test]
    fn test_parse_failures_are_malformed() {
        let cases = [
            "not a calendar at all",
            "BEGIN:VCALENDAR\nBEGIN:VTODO\nDTSTART:20240310T090000Z\nEND:VTODO\nEND:VCALENDAR\n",
            "BEGIN:VEVENT\nSUMMARY:No start\nEND:VEVENT\n",
            "BEGIN:VEVENT\nDTSTART:20240310T090000Z\n",
            "BEGIN:VEVENT\nDTSTART:yesterday\nEND:VEVENT\n",
            "BEGIN:VEVENT\nDTSTART:20240310T090000Z\nDURATION:P9999999999D\nEND:VEVENT\n",
            "BEGIN:VEVENT\nDTSTART:20240310T090000Z\nDURATION:P99999999999999W\nEND:VEVENT\n",
            "BEGIN:VEVENT\nDTSTART:20240310T090000Z\nRDATE;VALUE=PERIOD:20240311T090000Z/P99999999D\nEND:VEVENT\n",
        ];
        for text in cases {
            let err = ICalendarCodec.parse(text).unwrap_err();
            assert!(matches!(err, AgendumError::MalformedCalendarObject(_)), "{text:?} gave {err:?}");
        }
    }

    #[test]
    fn test_serialize_then_parse_preserves_event() {
        let original = ICalendarCodec.parse(MEETING).unwrap();
        let text = ICalendarCodec.serialize(&original);

        assert!(text.starts_with("BEGIN:VEVENT\r\n"));
        assert!(text.ends_with("END:VEVENT\r\n"));
        assert!(text.contains("SUMMARY:Planning\\, weekly\r\n"));
        assert!(text.contains("RDATE;VALUE=PERIOD:20240320T140000Z/20240320T160000Z\r\n"));
        assert_eq!(ICalendarCodec.parse(&text).unwrap(), original);
    }
}
