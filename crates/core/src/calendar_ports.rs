//! Calendar backend port interfaces
//!
//! These traits define the boundary between the period-query pipeline and
//! the pluggable sources that store calendar data.
//!
//! Every backend implements [`CalendarBackend`]. Optional operations are
//! separate traits; a backend exposes one by overriding the matching `as_*`
//! accessor. The accessors are probed once when the backend is registered and
//! the result is frozen into its [`CapabilitySet`](agendum_domain::CapabilitySet).

use agendum_domain::{
    BackendId, CalendarDescriptor, CalendarId, CalendarObjectRecord, EventDefinition, ObjectId,
    ObjectType, Period, Result,
};
use async_trait::async_trait;

use crate::query::ItemFailure;

/// Mandatory backend surface.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Stable identifier, also the prefix of every calendar id it owns.
    fn id(&self) -> &BackendId;

    /// List the calendars visible to `user_id`.
    async fn list_calendars(
        &self,
        user_id: &str,
        writable_only: bool,
    ) -> Result<Vec<CalendarDescriptor>>;

    /// Every object stored in `calendar`.
    async fn get_objects(&self, calendar: &CalendarId) -> Result<Vec<CalendarObjectRecord>>;

    /// Descriptor of `calendar`, if this backend stores it.
    async fn find_calendar(&self, _calendar: &CalendarId) -> Result<Option<CalendarDescriptor>> {
        Ok(None)
    }

    /// A single object of `calendar`, if present.
    async fn find_object(
        &self,
        _calendar: &CalendarId,
        _object_id: ObjectId,
    ) -> Result<Option<CalendarObjectRecord>> {
        Ok(None)
    }

    /// Whether `user_id` owns `calendar` and may write to it.
    fn is_calendar_writable_by_user(&self, _calendar: &CalendarId, _user_id: &str) -> bool {
        false
    }

    /// Whether callers may cache this backend's calendars.
    fn cache_it(&self) -> bool {
        true
    }

    /// Creating calendars, if supported.
    fn as_create_calendar(&self) -> Option<&dyn CreateCalendar> {
        None
    }

    /// Editing calendars, if supported.
    fn as_edit_calendar(&self) -> Option<&dyn EditCalendar> {
        None
    }

    /// Deleting calendars, if supported.
    fn as_delete_calendar(&self) -> Option<&dyn DeleteCalendar> {
        None
    }

    /// Touching calendars, if supported.
    fn as_touch_calendar(&self) -> Option<&dyn TouchCalendar> {
        None
    }

    /// Merging calendars, if supported.
    fn as_merge_calendar(&self) -> Option<&dyn MergeCalendar> {
        None
    }

    /// Creating objects, if supported.
    fn as_create_object(&self) -> Option<&dyn CreateObject> {
        None
    }

    /// Editing objects, if supported.
    fn as_edit_object(&self) -> Option<&dyn EditObject> {
        None
    }

    /// Deleting objects, if supported.
    fn as_delete_object(&self) -> Option<&dyn DeleteObject> {
        None
    }

    /// Moving objects, if supported.
    fn as_move_object(&self) -> Option<&dyn MoveObject> {
        None
    }

    /// Server-side period filtering, if supported.
    fn as_get_in_period(&self) -> Option<&dyn GetInPeriod> {
        None
    }

    /// Fetching objects by type, if supported.
    fn as_get_by_type(&self) -> Option<&dyn GetByType> {
        None
    }

    /// Period filtering by type, if supported.
    fn as_get_in_period_by_type(&self) -> Option<&dyn GetInPeriodByType> {
        None
    }
}

/// Optional `CreateCalendar` capability.
#[async_trait]
pub trait CreateCalendar: Send + Sync {
    /// Store a new calendar; fails with `InvalidInput` if its id is taken.
    async fn create_calendar(&self, calendar: CalendarDescriptor) -> Result<()>;
}

/// Optional `EditCalendar` capability.
#[async_trait]
pub trait EditCalendar: Send + Sync {
    /// Replace the descriptor of an existing calendar.
    async fn edit_calendar(&self, calendar: CalendarDescriptor) -> Result<()>;
}

/// Optional `DeleteCalendar` capability.
#[async_trait]
pub trait DeleteCalendar: Send + Sync {
    /// Remove a calendar together with its objects.
    async fn delete_calendar(&self, calendar: &CalendarId) -> Result<()>;
}

/// Bump a calendar's change marker without modifying its contents.
#[async_trait]
pub trait TouchCalendar: Send + Sync {
    /// Advance the change marker of `calendar`.
    async fn touch_calendar(&self, calendar: &CalendarId) -> Result<()>;
}

/// Move every object of `source` into `target` and drop `source`.
#[async_trait]
pub trait MergeCalendar: Send + Sync {
    /// Move all objects of `source` into `target`, then drop `source`.
    async fn merge_calendar(&self, source: &CalendarId, target: &CalendarId) -> Result<()>;
}

/// Optional `CreateObject` capability.
#[async_trait]
pub trait CreateObject: Send + Sync {
    /// Store a new object in the calendar named by the record.
    async fn create_object(&self, record: CalendarObjectRecord) -> Result<()>;
}

/// Optional `EditObject` capability.
#[async_trait]
pub trait EditObject: Send + Sync {
    /// Replace the stored copy of an existing object.
    async fn edit_object(&self, record: CalendarObjectRecord) -> Result<()>;
}

/// Optional `DeleteObject` capability.
#[async_trait]
pub trait DeleteObject: Send + Sync {
    /// Remove one object from `calendar`.
    async fn delete_object(&self, calendar: &CalendarId, object_id: ObjectId) -> Result<()>;
}

/// Optional `MoveObject` capability.
#[async_trait]
pub trait MoveObject: Send + Sync {
    /// Reassign an object from one calendar to another.
    async fn move_object(
        &self,
        object_id: ObjectId,
        from: &CalendarId,
        to: &CalendarId,
    ) -> Result<()>;
}

/// Server-side period filtering.
///
/// Implementations must return every object with at least one occurrence
/// overlapping `period`, recurring objects included.
#[async_trait]
pub trait GetInPeriod: Send + Sync {
    /// Objects of `calendar` with an occurrence overlapping `period`.
    async fn get_in_period(
        &self,
        calendar: &CalendarId,
        period: &Period,
    ) -> Result<Vec<CalendarObjectRecord>>;
}

/// Optional `GetByType` capability.
#[async_trait]
pub trait GetByType: Send + Sync {
    /// Objects of `calendar` whose component type is `object_type`.
    async fn get_by_type(
        &self,
        calendar: &CalendarId,
        object_type: ObjectType,
    ) -> Result<Vec<CalendarObjectRecord>>;
}

/// Optional `GetInPeriodByType` capability.
#[async_trait]
pub trait GetInPeriodByType: Send + Sync {
    /// Objects of `object_type` with an occurrence overlapping `period`.
    async fn get_in_period_by_type(
        &self,
        calendar: &CalendarId,
        period: &Period,
        object_type: ObjectType,
    ) -> Result<Vec<CalendarObjectRecord>>;
}

/// Calendar-text codec.
pub trait CalendarCodec: Send + Sync {
    /// Decode the first VEVENT of a calendar document.
    ///
    /// Fails with `MalformedCalendarObject` when the text cannot be parsed or
    /// holds no event component.
    fn parse(&self, text: &str) -> Result<EventDefinition>;

    /// Encode an event as a `BEGIN:VEVENT ... END:VEVENT` block.
    fn serialize(&self, event: &EventDefinition) -> String;
}

/// Receives one record per item excluded from a query result.
pub trait FailureSink: Send + Sync {
    /// Called once for every excluded item.
    fn record(&self, failure: &ItemFailure);
}
