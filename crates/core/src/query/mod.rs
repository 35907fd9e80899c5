//! Period queries: per-calendar retrieval, concurrent orchestration and
//! ordered aggregation.

pub mod aggregate;
pub mod engine;
pub mod service;

pub use aggregate::{ItemFailure, ItemKey, ItemOutcome, ResultAggregator, TracingFailureSink};
pub use engine::{filter_in_period, PeriodQueryEngine};
pub use service::{OccurrenceService, QueryRequest};
