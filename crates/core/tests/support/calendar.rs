use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agendum_core::{CalendarBackend, GetInPeriod};
use agendum_domain::{
    AgendumError, BackendId, CalendarDescriptor, CalendarId, CalendarObjectRecord, Period,
    Result as DomainResult,
};
use async_trait::async_trait;

/// In-memory mock for `CalendarBackend`.
///
/// Records are returned exactly as seeded. Period support, latency and
/// failures are switched on per test; call counters show which retrieval
/// path the engine took.
#[derive(Clone)]
pub struct MockCalendarBackend {
    id: BackendId,
    calendars: Arc<Mutex<Vec<CalendarDescriptor>>>,
    objects: Arc<Mutex<HashMap<String, Vec<CalendarObjectRecord>>>>,
    period_capable: bool,
    delay: Option<Duration>,
    failing: bool,
    get_objects_calls: Arc<AtomicUsize>,
    get_in_period_calls: Arc<AtomicUsize>,
}

impl MockCalendarBackend {
    /// Backend offering only the mandatory operations.
    pub fn new(id: &str) -> Self {
        Self {
            id: BackendId::new(id),
            calendars: Arc::default(),
            objects: Arc::default(),
            period_capable: false,
            delay: None,
            failing: false,
            get_objects_calls: Arc::default(),
            get_in_period_calls: Arc::default(),
        }
    }

    pub fn with_period_support(mut self) -> Self {
        self.period_capable = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Seed a calendar owned by `owner` with the given records.
    pub fn with_calendar(self, uri: &str, owner: &str, records: Vec<CalendarObjectRecord>) -> Self {
        let id = CalendarId::new(self.id.clone(), uri);
        self.calendars.lock().unwrap().push(CalendarDescriptor {
            id,
            display_name: uri.to_string(),
            owner: owner.to_string(),
            writable: true,
        });
        self.objects.lock().unwrap().insert(uri.to_string(), records);
        self
    }

    pub fn calendar_id(&self, uri: &str) -> CalendarId {
        CalendarId::new(self.id.clone(), uri)
    }

    pub fn get_objects_calls(&self) -> usize {
        self.get_objects_calls.load(Ordering::SeqCst)
    }

    pub fn get_in_period_calls(&self) -> usize {
        self.get_in_period_calls.load(Ordering::SeqCst)
    }

    async fn load(&self, calendar: &CalendarId) -> DomainResult<Vec<CalendarObjectRecord>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(AgendumError::Backend(format!("{} is offline", self.id)));
        }
        Ok(self.objects.lock().unwrap().get(&calendar.uri).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CalendarBackend for MockCalendarBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn list_calendars(
        &self,
        user_id: &str,
        writable_only: bool,
    ) -> DomainResult<Vec<CalendarDescriptor>> {
        Ok(self
            .calendars
            .lock()
            .unwrap()
            .iter()
            .filter(|calendar| calendar.owner == user_id && (!writable_only || calendar.writable))
            .cloned()
            .collect())
    }

    async fn get_objects(&self, calendar: &CalendarId) -> DomainResult<Vec<CalendarObjectRecord>> {
        self.get_objects_calls.fetch_add(1, Ordering::SeqCst);
        self.load(calendar).await
    }

    fn as_get_in_period(&self) -> Option<&dyn GetInPeriod> {
        if self.period_capable {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl GetInPeriod for MockCalendarBackend {
    async fn get_in_period(
        &self,
        calendar: &CalendarId,
        _period: &Period,
    ) -> DomainResult<Vec<CalendarObjectRecord>> {
        self.get_in_period_calls.fetch_add(1, Ordering::SeqCst);
        self.load(calendar).await
    }
}
