//! Per-record materialization
//!
//! Bridges stored records and the expansion pipeline: decodes the payload,
//! expands it and projects every span into an [`Occurrence`].

use agendum_domain::constants::{CALENDAR_PRODID, CALENDAR_VERSION};
use agendum_domain::{
    CalendarObjectRecord, EventDefinition, ObjectId, ObjectPayload, Occurrence, Period, Result,
};

use super::projection::OccurrenceProjector;
use super::recurrence::RecurrenceExpander;
use crate::calendar_ports::CalendarCodec;

/// The event carried by `record`, decoding calendar text when needed.
pub fn event_of(record: &CalendarObjectRecord, codec: &dyn CalendarCodec) -> Result<EventDefinition> {
    match &record.payload {
        ObjectPayload::Event(event) => Ok(event.as_ref().clone()),
        ObjectPayload::CalendarData(text) => codec.parse(text),
    }
}

/// Full calendar document for `record`.
///
/// Records holding only a parsed event are serialized and wrapped in a
/// `VCALENDAR` envelope.
#[must_use]
pub fn calendar_data(record: &CalendarObjectRecord, codec: &dyn CalendarCodec) -> String {
    match &record.payload {
        ObjectPayload::CalendarData(text) => text.clone(),
        ObjectPayload::Event(event) => format!(
            "BEGIN:VCALENDAR\r\nVERSION:{CALENDAR_VERSION}\r\nPRODID:{CALENDAR_PRODID}\r\n{}END:VCALENDAR\r\n",
            codec.serialize(event)
        ),
    }
}

/// Occurrences of `event` inside `period`, projected for output.
pub fn occurrences_of(
    object_id: ObjectId,
    event: &EventDefinition,
    expander: &RecurrenceExpander,
    projector: &OccurrenceProjector,
    period: &Period,
) -> Result<Vec<Occurrence>> {
    let all_day = event.is_all_day();
    let title = event.title();
    let description = event.description_or_default();
    let last_modified = event.last_modified_unix();

    Ok(expander
        .expand(event, period)?
        .into_iter()
        .map(|span| {
            let projected = projector.project(span, all_day);
            Occurrence {
                object_id,
                title: title.to_string(),
                description: description.to_string(),
                last_modified,
                all_day,
                start: projected.start,
                end: projected.end,
            }
        })
        .collect())
}

/// Decode, expand and project one record.
pub fn expand_record(
    record: &CalendarObjectRecord,
    codec: &dyn CalendarCodec,
    expander: &RecurrenceExpander,
    projector: &OccurrenceProjector,
    period: &Period,
) -> Result<Vec<Occurrence>> {
    let event = event_of(record, codec)?;
    occurrences_of(record.id, &event, expander, projector, period)
}
