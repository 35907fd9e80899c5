#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use agendum_core::{BackendRegistry, CreateCalendar, CreateObject, FailureSink, ItemFailure, OccurrenceService};
use agendum_domain::{CalendarDescriptor, CalendarId, CalendarObjectRecord, Period, QueryConfig};
use agendum_infra::{ICalendarCodec, MemoryBackend};
use chrono::{DateTime, TimeZone, Utc};

/// Failure sink that keeps every record for later inspection.
#[derive(Default)]
pub struct CollectingFailureSink {
    failures: Mutex<Vec<ItemFailure>>,
}

impl CollectingFailureSink {
    pub fn failures(&self) -> Vec<ItemFailure> {
        self.failures.lock().expect("failure sink lock poisoned").clone()
    }
}

impl FailureSink for CollectingFailureSink {
    fn record(&self, failure: &ItemFailure) {
        self.failures.lock().expect("failure sink lock poisoned").push(failure.clone());
    }
}

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single().expect("valid date")
}

pub fn period(from: (i32, u32, u32), to: (i32, u32, u32)) -> Period {
    Period::new(utc(from.0, from.1, from.2), utc(to.0, to.1, to.2)).expect("valid period")
}

/// Wrap VEVENT lines in a calendar document.
pub fn vcalendar(event_lines: &[&str]) -> String {
    let mut text = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Tests//EN\r\nBEGIN:VEVENT\r\n");
    for line in event_lines {
        text.push_str(line);
        text.push_str("\r\n");
    }
    text.push_str("END:VEVENT\r\nEND:VCALENDAR\r\n");
    text
}

/// Create `uri` owned by `owner` and store `objects` in it.
pub async fn seed(
    backend: &MemoryBackend,
    uri: &str,
    owner: &str,
    objects: &[(i64, String)],
) -> CalendarId {
    let calendar = backend.calendar_id(uri);
    backend
        .create_calendar(CalendarDescriptor {
            id: calendar.clone(),
            display_name: uri.to_string(),
            owner: owner.to_string(),
            writable: true,
        })
        .await
        .expect("calendar should be created");
    for (id, text) in objects {
        backend
            .create_object(CalendarObjectRecord::from_text(*id, calendar.clone(), text.clone()))
            .await
            .expect("object should be stored");
    }
    calendar
}

/// Service over `backends` with a collecting sink.
pub fn service(
    backends: Vec<Arc<MemoryBackend>>,
    config: &QueryConfig,
) -> (OccurrenceService, Arc<CollectingFailureSink>) {
    let mut registry = BackendRegistry::new();
    for backend in backends {
        registry.register(backend);
    }
    let sink = Arc::new(CollectingFailureSink::default());
    let service = OccurrenceService::new(Arc::new(registry), Arc::new(ICalendarCodec::new()))
        .with_config(config)
        .with_failure_sink(sink.clone());
    (service, sink)
}
