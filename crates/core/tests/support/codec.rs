use std::sync::Mutex;
use std::time::Duration;

use agendum_core::{CalendarCodec, FailureSink, ItemFailure};
use agendum_domain::{AgendumError, EventDefinition, Result as DomainResult};

/// Codec that stores events as JSON, keeping core tests independent of the
/// iCalendar codec in infra.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode(event: &EventDefinition) -> String {
        serde_json::to_string(event).unwrap()
    }
}

impl CalendarCodec for JsonCodec {
    fn parse(&self, text: &str) -> DomainResult<EventDefinition> {
        serde_json::from_str(text)
            .map_err(|err| AgendumError::MalformedCalendarObject(format!("invalid event json: {err}")))
    }

    fn serialize(&self, event: &EventDefinition) -> String {
        Self::encode(event)
    }
}

/// JSON codec that blocks the calling thread before parsing any text
/// containing `marker`, to push an expansion past its timeout.
#[derive(Debug, Clone)]
pub struct StallingCodec {
    marker: String,
    stall: Duration,
}

impl StallingCodec {
    pub fn new(marker: &str, stall: Duration) -> Self {
        Self { marker: marker.to_string(), stall }
    }
}

impl CalendarCodec for StallingCodec {
    fn parse(&self, text: &str) -> DomainResult<EventDefinition> {
        if text.contains(&self.marker) {
            std::thread::sleep(self.stall);
        }
        JsonCodec.parse(text)
    }

    fn serialize(&self, event: &EventDefinition) -> String {
        JsonCodec.serialize(event)
    }
}

/// Failure sink that keeps every record for assertions.
#[derive(Debug, Default)]
pub struct CollectingFailureSink {
    failures: Mutex<Vec<ItemFailure>>,
}

impl CollectingFailureSink {
    pub fn failures(&self) -> Vec<ItemFailure> {
        self.failures.lock().unwrap().clone()
    }
}

impl FailureSink for CollectingFailureSink {
    fn record(&self, failure: &ItemFailure) {
        self.failures.lock().unwrap().push(failure.clone());
    }
}
