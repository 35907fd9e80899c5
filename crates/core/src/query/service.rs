//! Occurrence service - orchestrates a multi-calendar period query

use std::sync::Arc;
use std::time::Duration;

use agendum_domain::{
    AgendumError, CalendarId, CalendarObjectRecord, ObjectType, Occurrence, Period,
    QueryConfig, Result,
};
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use super::aggregate::{ItemFailure, ItemKey, ItemOutcome, ResultAggregator};
use super::engine::PeriodQueryEngine;
use crate::backend::{BackendDescriptor, BackendRegistry};
use crate::calendar_ports::{CalendarCodec, FailureSink};
use crate::occurrence::{expand_record, OccurrenceProjector, RecurrenceExpander};

/// A period query over several calendars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub calendars: Vec<CalendarId>,
    pub period: Period,
    /// IANA zone for timed output; the configured default when unset.
    pub timezone: Option<String>,
}

impl QueryRequest {
    #[must_use]
    pub fn new(calendars: Vec<CalendarId>, period: Period) -> Self {
        Self { calendars, period, timezone: None }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A calendar resolved to its backend before any fetch starts.
struct FetchTarget {
    backend_rank: usize,
    calendar_rank: usize,
    descriptor: BackendDescriptor,
    calendar: CalendarId,
}

impl FetchTarget {
    const fn key(&self, object_rank: usize) -> ItemKey {
        ItemKey::new(self.backend_rank, self.calendar_rank, object_rank)
    }
}

struct ExpansionJob {
    key: ItemKey,
    calendar: CalendarId,
    record: CalendarObjectRecord,
}

/// Occurrence service
///
/// Fetches calendars concurrently (bounded by the fan-out limit), expands
/// every record on the blocking pool and aggregates the results in
/// deterministic order. Per-item failures never fail the query.
pub struct OccurrenceService {
    engine: PeriodQueryEngine,
    aggregator: ResultAggregator,
    fan_out_limit: usize,
    item_timeout: Duration,
    default_timezone: String,
}

impl OccurrenceService {
    /// Service with default query settings and the tracing failure sink.
    #[must_use]
    pub fn new(registry: Arc<BackendRegistry>, codec: Arc<dyn CalendarCodec>) -> Self {
        Self {
            engine: PeriodQueryEngine::new(registry, codec),
            aggregator: ResultAggregator::default(),
            fan_out_limit: 1,
            item_timeout: Duration::ZERO,
            default_timezone: String::new(),
        }
        .with_config(&QueryConfig::default())
    }

    /// Apply query settings.
    #[must_use]
    pub fn with_config(mut self, config: &QueryConfig) -> Self {
        self.engine = self.engine.with_expander(RecurrenceExpander::new(config.max_occurrences));
        self.fan_out_limit = config.fan_out_limit.max(1);
        self.item_timeout = config.item_timeout();
        self.default_timezone = config.default_timezone.clone();
        self
    }

    /// Replace the sink that receives per-item failures.
    #[must_use]
    pub fn with_failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.aggregator = ResultAggregator::new(sink);
        self
    }

    #[must_use]
    pub const fn engine(&self) -> &PeriodQueryEngine {
        &self.engine
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        self.engine.registry()
    }

    /// Occurrences of every requested calendar inside the period.
    ///
    /// Fails as a whole only when the target zone is unknown or a calendar
    /// names an unregistered backend; both are checked before any fetch.
    #[instrument(skip(self, request), fields(calendars = request.calendars.len()))]
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<Occurrence>> {
        let tzid = request.timezone.as_deref().unwrap_or(&self.default_timezone);
        let projector = OccurrenceProjector::new(tzid)?;
        let targets = self.resolve(&request.calendars)?;
        let period = request.period;

        let fetched: Vec<(FetchTarget, Result<Vec<CalendarObjectRecord>>)> = stream::iter(targets)
            .map(|target| async move {
                let records = self.fetch_with_timeout(&target, &period).await;
                (target, records)
            })
            .buffer_unordered(self.fan_out_limit)
            .collect()
            .await;

        let mut outcomes = Vec::new();
        let mut jobs = Vec::new();
        for (target, records) in fetched {
            match records {
                Ok(records) => jobs.extend(expansion_jobs(&target, records)),
                Err(error) => outcomes.push(ItemOutcome::failure(
                    target.key(0),
                    ItemFailure::calendar(target.calendar, error),
                )),
            }
        }
        debug!(jobs = jobs.len(), "expanding calendar objects");

        let expanded: Vec<ItemOutcome> = stream::iter(jobs)
            .map(|job| self.run_expansion(job, projector, period))
            .buffer_unordered(self.fan_out_limit)
            .collect()
            .await;
        outcomes.extend(expanded);

        let occurrences = self.aggregator.aggregate(outcomes);
        info!(occurrences = occurrences.len(), "period query complete");
        Ok(occurrences)
    }

    /// Query every calendar visible to `user_id`, backend by backend in
    /// registration order.
    #[instrument(skip(self, period, timezone))]
    pub async fn query_user(
        &self,
        user_id: &str,
        period: Period,
        timezone: Option<&str>,
    ) -> Result<Vec<Occurrence>> {
        let mut calendars = Vec::new();
        for descriptor in self.registry().all() {
            let listed = timeout(self.item_timeout, descriptor.backend().list_calendars(user_id, false))
                .await
                .map_err(|_| self.timed_out(format!("listing calendars of backend '{}'", descriptor.id())))??;
            calendars.extend(listed.into_iter().map(|calendar| calendar.id));
        }

        let request = QueryRequest { calendars, period, timezone: timezone.map(str::to_string) };
        self.query(&request).await
    }

    fn resolve(&self, calendars: &[CalendarId]) -> Result<Vec<FetchTarget>> {
        calendars
            .iter()
            .enumerate()
            .map(|(calendar_rank, calendar)| {
                let (backend_rank, descriptor) = self.registry().find_ranked(&calendar.backend)?;
                Ok(FetchTarget {
                    backend_rank,
                    calendar_rank,
                    descriptor: descriptor.clone(),
                    calendar: calendar.clone(),
                })
            })
            .collect()
    }

    async fn fetch_with_timeout(
        &self,
        target: &FetchTarget,
        period: &Period,
    ) -> Result<Vec<CalendarObjectRecord>> {
        timeout(self.item_timeout, self.engine.fetch(&target.descriptor, &target.calendar, period))
            .await
            .map_err(|_| self.timed_out(format!("fetching calendar {}", target.calendar)))?
    }

    async fn run_expansion(
        &self,
        job: ExpansionJob,
        projector: OccurrenceProjector,
        period: Period,
    ) -> ItemOutcome {
        let ExpansionJob { key, calendar, record } = job;
        let object_id = record.id;
        let codec = Arc::clone(self.engine.codec());
        let expander = self.engine.expander();

        // On timeout the handle is dropped; the blocking task runs to
        // completion and its result is discarded.
        let handle = tokio::task::spawn_blocking(move || {
            expand_record(&record, codec.as_ref(), &expander, &projector, &period)
        });
        let result = match timeout(self.item_timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Err(AgendumError::Internal(format!("expansion task failed: {err}"))),
            Err(_) => Err(self.timed_out(format!("expanding object {object_id}"))),
        };

        match result {
            Ok(occurrences) => ItemOutcome::success(key, occurrences),
            Err(error) => ItemOutcome::failure(key, ItemFailure::object(calendar, object_id, error)),
        }
    }

    fn timed_out(&self, what: String) -> AgendumError {
        AgendumError::Timeout(format!("{what} exceeded {} ms", self.item_timeout.as_millis()))
    }
}

/// One expansion job per event record; other component types are skipped.
fn expansion_jobs(target: &FetchTarget, records: Vec<CalendarObjectRecord>) -> Vec<ExpansionJob> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(object_rank, record)| {
            if record.object_type != ObjectType::Event {
                debug!(object_id = record.id, object_type = %record.object_type, "skipping non-event object");
                return None;
            }
            Some(ExpansionJob { key: target.key(object_rank), calendar: target.calendar.clone(), record })
        })
        .collect()
}

