//! Result aggregation
//!
//! Per-item work runs concurrently, so outcomes arrive in arbitrary order.
//! The aggregator restores the deterministic output order, drops failures and
//! hands each one to a [`FailureSink`].

use std::sync::Arc;

use agendum_domain::{AgendumError, CalendarId, ObjectId, Occurrence};
use serde::Serialize;
use tracing::warn;

use crate::calendar_ports::FailureSink;

/// Position of an item in the output order.
///
/// Ordered by backend registration rank, then the calendar's position in the
/// request, then the record's position in what the backend returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemKey {
    pub backend_rank: usize,
    pub calendar_rank: usize,
    pub object_rank: usize,
}

impl ItemKey {
    #[must_use]
    pub const fn new(backend_rank: usize, calendar_rank: usize, object_rank: usize) -> Self {
        Self { backend_rank, calendar_rank, object_rank }
    }
}

/// An item excluded from a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub calendar_id: CalendarId,
    /// Unset when the whole calendar fetch failed.
    pub object_id: Option<ObjectId>,
    pub error: AgendumError,
}

impl ItemFailure {
    #[must_use]
    pub const fn calendar(calendar_id: CalendarId, error: AgendumError) -> Self {
        Self { calendar_id, object_id: None, error }
    }

    #[must_use]
    pub const fn object(calendar_id: CalendarId, object_id: ObjectId, error: AgendumError) -> Self {
        Self { calendar_id, object_id: Some(object_id), error }
    }
}

/// Result of one fetch or expansion job.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub key: ItemKey,
    pub result: Result<Vec<Occurrence>, ItemFailure>,
}

impl ItemOutcome {
    #[must_use]
    pub const fn success(key: ItemKey, occurrences: Vec<Occurrence>) -> Self {
        Self { key, result: Ok(occurrences) }
    }

    #[must_use]
    pub const fn failure(key: ItemKey, failure: ItemFailure) -> Self {
        Self { key, result: Err(failure) }
    }
}

/// Default sink: one structured warning per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn record(&self, failure: &ItemFailure) {
        warn!(
            calendar_id = %failure.calendar_id,
            object_id = ?failure.object_id,
            error_type = failure.error.label(),
            error = %failure.error,
            "calendar item excluded from query result"
        );
    }
}

pub struct ResultAggregator {
    sink: Arc<dyn FailureSink>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(Arc::new(TracingFailureSink))
    }
}

impl ResultAggregator {
    #[must_use]
    pub fn new(sink: Arc<dyn FailureSink>) -> Self {
        Self { sink }
    }

    /// Flatten outcomes into the ordered occurrence list.
    ///
    /// The sort is stable, so occurrences of one item keep their ascending
    /// start order. Failures are reported in output order.
    pub fn aggregate(&self, mut outcomes: Vec<ItemOutcome>) -> Vec<Occurrence> {
        outcomes.sort_by_key(|outcome| outcome.key);

        let mut occurrences = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(items) => occurrences.extend(items),
                Err(failure) => self.sink.record(&failure),
            }
        }
        occurrences
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Collecting(Mutex<Vec<ItemFailure>>);

    impl FailureSink for Collecting {
        fn record(&self, failure: &ItemFailure) {
            self.0.lock().unwrap().push(failure.clone());
        }
    }

    fn occurrence(object_id: ObjectId, start: &str) -> Occurrence {
        Occurrence {
            object_id,
            title: format!("event {object_id}"),
            description: String::new(),
            last_modified: 0,
            all_day: false,
            start: start.to_string(),
            end: start.to_string(),
        }
    }

    fn shuffled_outcomes() -> Vec<ItemOutcome> {
        let calendar = CalendarId::new("b", "work");
        vec![
            ItemOutcome::success(ItemKey::new(1, 0, 0), vec![occurrence(30, "2024-03-01 09:00:00")]),
            ItemOutcome::failure(
                ItemKey::new(0, 1, 1),
                ItemFailure::object(calendar, 21, AgendumError::Recurrence("bad rule".into())),
            ),
            ItemOutcome::success(
                ItemKey::new(0, 1, 0),
                vec![occurrence(20, "2024-03-02 09:00:00"), occurrence(20, "2024-03-09 09:00:00")],
            ),
            ItemOutcome::success(ItemKey::new(0, 0, 0), vec![occurrence(10, "2024-03-05 09:00:00")]),
        ]
    }

    #[test]
    fn test_orders_by_key_and_keeps_item_order() {
        let aggregator = ResultAggregator::new(Arc::new(Collecting::default()));
        let ids: Vec<(ObjectId, String)> = aggregator
            .aggregate(shuffled_outcomes())
            .into_iter()
            .map(|o| (o.object_id, o.start))
            .collect();

        assert_eq!(
            ids,
            vec![
                (10, "2024-03-05 09:00:00".to_string()),
                (20, "2024-03-02 09:00:00".to_string()),
                (20, "2024-03-09 09:00:00".to_string()),
                (30, "2024-03-01 09:00:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_failures_reach_sink_once() {
        let sink = Arc::new(Collecting::default());
        let aggregator = ResultAggregator::new(sink.clone());
        aggregator.aggregate(shuffled_outcomes());

        let failures = sink.0.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].object_id, Some(21));
        assert_eq!(failures[0].error.label(), "recurrence");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let aggregator = ResultAggregator::default();
        let first = aggregator.aggregate(shuffled_outcomes());
        let mut reversed = shuffled_outcomes();
        reversed.reverse();
        assert_eq!(first, aggregator.aggregate(reversed));
        assert_eq!(first, aggregator.aggregate(shuffled_outcomes()));
    }

    #[test]
    fn test_empty_input() {
        assert!(ResultAggregator::default().aggregate(Vec::new()).is_empty());
    }
}
