//! Raw calendar objects as handed over by backends

use serde::{Deserialize, Serialize};

use super::calendar::{CalendarId, ObjectId};
use super::event::EventDefinition;

/// Component type of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    #[default]
    Event,
    Todo,
    Journal,
}

crate::impl_domain_enum_conversions!(ObjectType {
    Event => "event",
    Todo => "todo",
    Journal => "journal",
});

/// Either calendar text or an already parsed event; never both, never neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectPayload {
    CalendarData(String),
    Event(Box<EventDefinition>),
}

/// One stored calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarObjectRecord {
    pub id: ObjectId,
    pub calendar_id: CalendarId,
    #[serde(default)]
    pub object_type: ObjectType,
    pub payload: ObjectPayload,
}

impl CalendarObjectRecord {
    #[must_use]
    pub fn from_text(id: ObjectId, calendar_id: CalendarId, text: impl Into<String>) -> Self {
        Self {
            id,
            calendar_id,
            object_type: ObjectType::Event,
            payload: ObjectPayload::CalendarData(text.into()),
        }
    }

    #[must_use]
    pub fn from_event(id: ObjectId, calendar_id: CalendarId, event: EventDefinition) -> Self {
        Self {
            id,
            calendar_id,
            object_type: ObjectType::Event,
            payload: ObjectPayload::Event(Box::new(event)),
        }
    }

    #[must_use]
    pub fn with_type(mut self, object_type: ObjectType) -> Self {
        self.object_type = object_type;
        self
    }
}
