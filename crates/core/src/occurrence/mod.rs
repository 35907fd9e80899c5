//! Occurrence computation: time resolution, recurrence expansion and
//! projection into the caller's timezone.

pub mod materialize;
pub mod projection;
pub mod recurrence;
pub mod time;

pub use materialize::{calendar_data, event_of, expand_record};
pub use projection::{all_day_end, OccurrenceProjector, ProjectedSpan};
pub use recurrence::{OccurrenceSpan, RecurrenceExpander};
