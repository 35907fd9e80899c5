//! In-memory calendar backend
//!
//! Keeps calendars and their objects in process memory. Implements every
//! optional capability; server-side period filtering can be switched off to
//! exercise the engine's in-engine path.

use std::sync::{Arc, PoisonError};

use agendum_core::occurrence::RecurrenceExpander;
use agendum_core::query::filter_in_period;
use agendum_core::{
    CalendarBackend, CalendarCodec, CreateCalendar, CreateObject, DeleteCalendar, DeleteObject,
    EditCalendar, EditObject, GetByType, GetInPeriod, GetInPeriodByType, MergeCalendar,
    MoveObject, TouchCalendar,
};
use agendum_domain::{
    AgendumError, BackendId, CalendarDescriptor, CalendarId, CalendarObjectRecord, ObjectId,
    ObjectType, Period, Result,
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::codec::ICalendarCodec;

#[derive(Debug, Clone)]
struct StoredCalendar {
    descriptor: CalendarDescriptor,
    objects: Vec<CalendarObjectRecord>,
    /// Change marker, bumped on every write and on touch.
    ctag: u64,
}

impl StoredCalendar {
    fn bump(&mut self) {
        self.ctag += 1;
    }
}

pub struct MemoryBackend {
    id: BackendId,
    codec: Arc<dyn CalendarCodec>,
    expander: RecurrenceExpander,
    period_queries: bool,
    cacheable: bool,
    calendars: RwLock<Vec<StoredCalendar>>,
    /// Descriptor copy for synchronous lookups, republished under the
    /// `calendars` write lock.
    descriptors: std::sync::RwLock<Vec<CalendarDescriptor>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new(id: impl Into<BackendId>) -> Self {
        Self {
            id: id.into(),
            codec: Arc::new(ICalendarCodec::new()),
            expander: RecurrenceExpander::default(),
            period_queries: true,
            cacheable: true,
            calendars: RwLock::new(Vec::new()),
            descriptors: std::sync::RwLock::new(Vec::new()),
        }
    }

    /// Codec used for server-side period filtering.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn CalendarCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Enable or disable the `GetInPeriod` capability.
    #[must_use]
    pub fn with_period_queries(mut self, enabled: bool) -> Self {
        self.period_queries = enabled;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    /// Calendar id for `uri` on this backend.
    #[must_use]
    pub fn calendar_id(&self, uri: &str) -> CalendarId {
        CalendarId::new(self.id.clone(), uri)
    }

    /// Current change marker of `calendar`.
    pub async fn ctag(&self, calendar: &CalendarId) -> Option<u64> {
        self.calendars
            .read()
            .await
            .iter()
            .find(|stored| &stored.descriptor.id == calendar)
            .map(|stored| stored.ctag)
    }

    fn publish(&self, calendars: &[StoredCalendar]) {
        let mut descriptors = self.descriptors.write().unwrap_or_else(PoisonError::into_inner);
        *descriptors = calendars.iter().map(|stored| stored.descriptor.clone()).collect();
    }

    fn check_owner(&self, calendar: &CalendarId) -> Result<()> {
        if calendar.backend == self.id {
            Ok(())
        } else {
            Err(AgendumError::InvalidInput(format!(
                "calendar {calendar} does not belong to backend '{}'",
                self.id
            )))
        }
    }
}

fn not_found(calendar: &CalendarId) -> AgendumError {
    AgendumError::NotFound(format!("calendar {calendar} does not exist"))
}

fn position(calendars: &[StoredCalendar], calendar: &CalendarId) -> Result<usize> {
    calendars
        .iter()
        .position(|stored| &stored.descriptor.id == calendar)
        .ok_or_else(|| not_found(calendar))
}

fn object_position(stored: &StoredCalendar, object_id: ObjectId) -> Result<usize> {
    stored.objects.iter().position(|record| record.id == object_id).ok_or_else(|| {
        AgendumError::NotFound(format!(
            "object {object_id} does not exist in {}",
            stored.descriptor.id
        ))
    })
}

#[async_trait]
impl CalendarBackend for MemoryBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn list_calendars(
        &self,
        user_id: &str,
        writable_only: bool,
    ) -> Result<Vec<CalendarDescriptor>> {
        Ok(self
            .calendars
            .read()
            .await
            .iter()
            .map(|stored| &stored.descriptor)
            .filter(|calendar| calendar.owner == user_id && (!writable_only || calendar.writable))
            .cloned()
            .collect())
    }

    async fn get_objects(&self, calendar: &CalendarId) -> Result<Vec<CalendarObjectRecord>> {
        let calendars = self.calendars.read().await;
        let index = position(&calendars, calendar)?;
        Ok(calendars[index].objects.clone())
    }

    async fn find_calendar(&self, calendar: &CalendarId) -> Result<Option<CalendarDescriptor>> {
        Ok(self
            .calendars
            .read()
            .await
            .iter()
            .find(|stored| &stored.descriptor.id == calendar)
            .map(|stored| stored.descriptor.clone()))
    }

    async fn find_object(
        &self,
        calendar: &CalendarId,
        object_id: ObjectId,
    ) -> Result<Option<CalendarObjectRecord>> {
        let calendars = self.calendars.read().await;
        let index = position(&calendars, calendar)?;
        Ok(calendars[index].objects.iter().find(|record| record.id == object_id).cloned())
    }

    fn is_calendar_writable_by_user(&self, calendar: &CalendarId, user_id: &str) -> bool {
        self.descriptors.read().unwrap_or_else(PoisonError::into_inner).iter().any(|descriptor| {
            &descriptor.id == calendar && descriptor.owner == user_id && descriptor.writable
        })
    }

    fn cache_it(&self) -> bool {
        self.cacheable
    }

    fn as_create_calendar(&self) -> Option<&dyn CreateCalendar> {
        Some(self)
    }

    fn as_edit_calendar(&self) -> Option<&dyn EditCalendar> {
        Some(self)
    }

    fn as_delete_calendar(&self) -> Option<&dyn DeleteCalendar> {
        Some(self)
    }

    fn as_touch_calendar(&self) -> Option<&dyn TouchCalendar> {
        Some(self)
    }

    fn as_merge_calendar(&self) -> Option<&dyn MergeCalendar> {
        Some(self)
    }

    fn as_create_object(&self) -> Option<&dyn CreateObject> {
        Some(self)
    }

    fn as_edit_object(&self) -> Option<&dyn EditObject> {
        Some(self)
    }

    fn as_delete_object(&self) -> Option<&dyn DeleteObject> {
        Some(self)
    }

    fn as_move_object(&self) -> Option<&dyn MoveObject> {
        Some(self)
    }

    fn as_get_in_period(&self) -> Option<&dyn GetInPeriod> {
        if self.period_queries {
            Some(self)
        } else {
            None
        }
    }

    fn as_get_by_type(&self) -> Option<&dyn GetByType> {
        Some(self)
    }

    fn as_get_in_period_by_type(&self) -> Option<&dyn GetInPeriodByType> {
        if self.period_queries {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl CreateCalendar for MemoryBackend {
    async fn create_calendar(&self, calendar: CalendarDescriptor) -> Result<()> {
        self.check_owner(&calendar.id)?;
        let mut calendars = self.calendars.write().await;
        if calendars.iter().any(|stored| stored.descriptor.id == calendar.id) {
            return Err(AgendumError::InvalidInput(format!("calendar {} already exists", calendar.id)));
        }
        debug!(calendar_id = %calendar.id, "creating calendar");
        calendars.push(StoredCalendar { descriptor: calendar, objects: Vec::new(), ctag: 0 });
        self.publish(&calendars);
        Ok(())
    }
}

#[async_trait]
impl EditCalendar for MemoryBackend {
    async fn edit_calendar(&self, calendar: CalendarDescriptor) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let index = position(&calendars, &calendar.id)?;
        let stored = &mut calendars[index];
        stored.descriptor = calendar;
        stored.bump();
        self.publish(&calendars);
        Ok(())
    }
}

#[async_trait]
impl DeleteCalendar for MemoryBackend {
    async fn delete_calendar(&self, calendar: &CalendarId) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let index = position(&calendars, calendar)?;
        calendars.remove(index);
        self.publish(&calendars);
        Ok(())
    }
}

#[async_trait]
impl TouchCalendar for MemoryBackend {
    async fn touch_calendar(&self, calendar: &CalendarId) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let index = position(&calendars, calendar)?;
        calendars[index].bump();
        Ok(())
    }
}

#[async_trait]
impl MergeCalendar for MemoryBackend {
    async fn merge_calendar(&self, source: &CalendarId, target: &CalendarId) -> Result<()> {
        if source == target {
            return Err(AgendumError::InvalidInput(format!("cannot merge {source} into itself")));
        }
        let mut calendars = self.calendars.write().await;
        let source_index = position(&calendars, source)?;
        position(&calendars, target)?;

        let merged = calendars.remove(source_index);
        let target_index = position(&calendars, target)?;
        let stored = &mut calendars[target_index];
        stored.objects.extend(merged.objects.into_iter().map(|mut record| {
            record.calendar_id = target.clone();
            record
        }));
        stored.bump();
        self.publish(&calendars);
        Ok(())
    }
}

#[async_trait]
impl CreateObject for MemoryBackend {
    async fn create_object(&self, record: CalendarObjectRecord) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let index = position(&calendars, &record.calendar_id)?;
        let stored = &mut calendars[index];
        if stored.objects.iter().any(|existing| existing.id == record.id) {
            return Err(AgendumError::InvalidInput(format!(
                "object {} already exists in {}",
                record.id, record.calendar_id
            )));
        }
        stored.objects.push(record);
        stored.bump();
        Ok(())
    }
}

#[async_trait]
impl EditObject for MemoryBackend {
    async fn edit_object(&self, record: CalendarObjectRecord) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let index = position(&calendars, &record.calendar_id)?;
        let stored = &mut calendars[index];
        let object_index = object_position(stored, record.id)?;
        stored.objects[object_index] = record;
        stored.bump();
        Ok(())
    }
}

#[async_trait]
impl DeleteObject for MemoryBackend {
    async fn delete_object(&self, calendar: &CalendarId, object_id: ObjectId) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let index = position(&calendars, calendar)?;
        let stored = &mut calendars[index];
        let object_index = object_position(stored, object_id)?;
        stored.objects.remove(object_index);
        stored.bump();
        Ok(())
    }
}

#[async_trait]
impl MoveObject for MemoryBackend {
    async fn move_object(
        &self,
        object_id: ObjectId,
        from: &CalendarId,
        to: &CalendarId,
    ) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let from_index = position(&calendars, from)?;
        let to_index = position(&calendars, to)?;
        let object_index = object_position(&calendars[from_index], object_id)?;
        if calendars[to_index].objects.iter().any(|record| record.id == object_id) {
            return Err(AgendumError::InvalidInput(format!(
                "object {object_id} already exists in {to}"
            )));
        }

        let mut record = calendars[from_index].objects.remove(object_index);
        record.calendar_id = to.clone();
        calendars[from_index].bump();
        calendars[to_index].objects.push(record);
        calendars[to_index].bump();
        Ok(())
    }
}

#[async_trait]
impl GetInPeriod for MemoryBackend {
    async fn get_in_period(
        &self,
        calendar: &CalendarId,
        period: &Period,
    ) -> Result<Vec<CalendarObjectRecord>> {
        let records = self.get_objects(calendar).await?;
        Ok(filter_in_period(records, self.codec.as_ref(), &self.expander, period))
    }
}

#[async_trait]
impl GetByType for MemoryBackend {
    async fn get_by_type(
        &self,
        calendar: &CalendarId,
        object_type: ObjectType,
    ) -> Result<Vec<CalendarObjectRecord>> {
        let mut records = self.get_objects(calendar).await?;
        records.retain(|record| record.object_type == object_type);
        Ok(records)
    }
}

#[async_trait]
impl GetInPeriodByType for MemoryBackend {
    async fn get_in_period_by_type(
        &self,
        calendar: &CalendarId,
        period: &Period,
        object_type: ObjectType,
    ) -> Result<Vec<CalendarObjectRecord>> {
        let mut records = self.get_in_period(calendar, period).await?;
        records.retain(|record| record.object_type == object_type);
        Ok(records)
    }
}
