//! Period query engine
//!
//! Retrieves the records of one calendar that touch a period, delegating the
//! filtering to the backend when it declares `GetInPeriod` and filtering
//! in-engine otherwise.

use std::sync::Arc;

use agendum_domain::{
    AgendumError, CalendarId, CalendarObjectRecord, Capability, ObjectType, Period, Result,
};
use tracing::{debug, instrument};

use crate::backend::{BackendDescriptor, BackendRegistry};
use crate::calendar_ports::CalendarCodec;
use crate::occurrence::{event_of, RecurrenceExpander};

pub struct PeriodQueryEngine {
    registry: Arc<BackendRegistry>,
    codec: Arc<dyn CalendarCodec>,
    expander: RecurrenceExpander,
}

impl PeriodQueryEngine {
    #[must_use]
    pub fn new(registry: Arc<BackendRegistry>, codec: Arc<dyn CalendarCodec>) -> Self {
        Self { registry, codec, expander: RecurrenceExpander::default() }
    }

    #[must_use]
    pub fn with_expander(mut self, expander: RecurrenceExpander) -> Self {
        self.expander = expander;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn codec(&self) -> &Arc<dyn CalendarCodec> {
        &self.codec
    }

    #[must_use]
    pub const fn expander(&self) -> RecurrenceExpander {
        self.expander
    }

    /// Records of `calendar` with at least one occurrence in `period`.
    pub async fn query_period(
        &self,
        calendar: &CalendarId,
        period: &Period,
    ) -> Result<Vec<CalendarObjectRecord>> {
        let descriptor = self.registry.resolve(calendar)?;
        self.fetch(descriptor, calendar, period).await
    }

    /// Like [`query_period`](Self::query_period), restricted to one object type.
    pub async fn query_period_by_type(
        &self,
        calendar: &CalendarId,
        period: &Period,
        object_type: ObjectType,
    ) -> Result<Vec<CalendarObjectRecord>> {
        let descriptor = self.registry.resolve(calendar)?;
        if descriptor.supports(Capability::GetInPeriodByType) {
            return descriptor
                .get_in_period_by_type()?
                .get_in_period_by_type(calendar, period, object_type)
                .await;
        }

        let mut records = self.fetch(descriptor, calendar, period).await?;
        records.retain(|record| record.object_type == object_type);
        Ok(records)
    }

    /// Fetch through an already resolved descriptor.
    #[instrument(skip(self, descriptor, period), fields(backend_id = %descriptor.id()))]
    pub async fn fetch(
        &self,
        descriptor: &BackendDescriptor,
        calendar: &CalendarId,
        period: &Period,
    ) -> Result<Vec<CalendarObjectRecord>> {
        if descriptor.supports(Capability::GetInPeriod) {
            debug!("backend filters by period");
            return descriptor.get_in_period()?.get_in_period(calendar, period).await;
        }

        let records = descriptor.backend().get_objects(calendar).await?;
        debug!(records = records.len(), "filtering calendar in-engine");

        let codec = Arc::clone(&self.codec);
        let expander = self.expander;
        let period = *period;
        tokio::task::spawn_blocking(move || filter_in_period(records, codec.as_ref(), &expander, &period))
            .await
            .map_err(|err| AgendumError::Internal(format!("in-engine filter task failed: {err}")))
    }
}

/// Keep records with at least one occurrence in `period`.
///
/// Records that fail to decode or expand are kept; the expansion step
/// reports them.
pub fn filter_in_period(
    records: Vec<CalendarObjectRecord>,
    codec: &dyn CalendarCodec,
    expander: &RecurrenceExpander,
    period: &Period,
) -> Vec<CalendarObjectRecord> {
    records
        .into_iter()
        .filter(|record| {
            if record.object_type != ObjectType::Event {
                return true;
            }
            event_of(record, codec)
                .and_then(|event| expander.expand(&event, period))
                .map_or(true, |spans| !spans.is_empty())
        })
        .collect()
}
