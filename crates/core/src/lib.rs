//! # Agendum Core
//!
//! Calendar aggregation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for calendar backends, the calendar-text codec and the
//!   failure sink
//! - Backend registration and capability discovery
//! - Recurrence expansion and timezone projection
//! - The period query pipeline and its orchestrating service
//!
//! ## Architecture Principles
//! - Only depends on `agendum-domain`
//! - No storage, network or parsing code; backends and codecs are injected
//! - The backend registry is an explicit value, never global state

pub mod backend;
pub mod calendar_ports;
pub mod occurrence;
pub mod query;

pub use backend::{BackendDescriptor, BackendRegistry, CapabilityRegistry};
pub use calendar_ports::{
    CalendarBackend, CalendarCodec, CreateCalendar, CreateObject, DeleteCalendar, DeleteObject,
    EditCalendar, EditObject, FailureSink, GetByType, GetInPeriod, GetInPeriodByType,
    MergeCalendar, MoveObject, TouchCalendar,
};
pub use occurrence::{OccurrenceProjector, OccurrenceSpan, RecurrenceExpander};
pub use query::{
    ItemFailure, OccurrenceService, PeriodQueryEngine, QueryRequest, ResultAggregator,
    TracingFailureSink,
};
