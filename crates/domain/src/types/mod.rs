//! Domain data types

pub mod calendar;
pub mod capability;
pub mod event;
pub mod object;
pub mod occurrence;
pub mod period;

pub use calendar::{BackendId, CalendarDescriptor, CalendarId, ObjectId};
pub use capability::{Capability, CapabilitySet};
pub use event::{EventDefinition, EventTime, Recurrence, RecurrenceDate};
pub use object::{CalendarObjectRecord, ObjectPayload, ObjectType};
pub use occurrence::Occurrence;
pub use period::Period;
