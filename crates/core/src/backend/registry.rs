//! Backend registry
//!
//! The registry is an explicit value built per session or request and handed
//! to the query pipeline (usually behind an `Arc`). It is never mutated while
//! queries run; registration order is the cross-backend output order.

use std::fmt;
use std::sync::Arc;

use agendum_domain::{
    AgendumError, BackendId, CalendarId, Capability, CapabilitySet, Result,
};
use tracing::{debug, info};

use super::capabilities::{probe, CapabilityRegistry};
use crate::calendar_ports::{
    CalendarBackend, CreateCalendar, CreateObject, DeleteCalendar, DeleteObject, EditCalendar,
    EditObject, GetByType, GetInPeriod, GetInPeriodByType, MergeCalendar, MoveObject,
    TouchCalendar,
};

/// A registered backend together with its frozen capability set.
#[derive(Clone)]
pub struct BackendDescriptor {
    id: BackendId,
    capabilities: CapabilitySet,
    backend: Arc<dyn CalendarBackend>,
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl BackendDescriptor {
    /// Wrap a backend, probing its capabilities once.
    #[must_use]
    pub fn new(backend: Arc<dyn CalendarBackend>) -> Self {
        let capabilities = probe(backend.as_ref());
        Self { id: backend.id().clone(), capabilities, backend }
    }

    #[must_use]
    pub const fn id(&self) -> &BackendId {
        &self.id
    }

    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Mandatory operations are always reachable through the backend itself.
    #[must_use]
    pub fn backend(&self) -> &dyn CalendarBackend {
        self.backend.as_ref()
    }

    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Fail with `UnsupportedCapability` unless `capability` was declared.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(self.unsupported(capability))
        }
    }

    fn unsupported(&self, capability: Capability) -> AgendumError {
        AgendumError::UnsupportedCapability(format!("backend '{}' lacks {capability}", self.id))
    }

    fn gated<'a, T: ?Sized>(
        &'a self,
        capability: Capability,
        accessor: impl FnOnce(&'a dyn CalendarBackend) -> Option<&'a T>,
    ) -> Result<&'a T> {
        self.require(capability)?;
        accessor(self.backend.as_ref()).ok_or_else(|| self.unsupported(capability))
    }

    pub fn create_calendar(&self) -> Result<&dyn CreateCalendar> {
        self.gated(Capability::CreateCalendar, |b| b.as_create_calendar())
    }

    pub fn edit_calendar(&self) -> Result<&dyn EditCalendar> {
        self.gated(Capability::EditCalendar, |b| b.as_edit_calendar())
    }

    pub fn delete_calendar(&self) -> Result<&dyn DeleteCalendar> {
        self.gated(Capability::DeleteCalendar, |b| b.as_delete_calendar())
    }

    pub fn touch_calendar(&self) -> Result<&dyn TouchCalendar> {
        self.gated(Capability::TouchCalendar, |b| b.as_touch_calendar())
    }

    pub fn merge_calendar(&self) -> Result<&dyn MergeCalendar> {
        self.gated(Capability::MergeCalendar, |b| b.as_merge_calendar())
    }

    pub fn create_object(&self) -> Result<&dyn CreateObject> {
        self.gated(Capability::CreateObject, |b| b.as_create_object())
    }

    pub fn edit_object(&self) -> Result<&dyn EditObject> {
        self.gated(Capability::EditObject, |b| b.as_edit_object())
    }

    pub fn delete_object(&self) -> Result<&dyn DeleteObject> {
        self.gated(Capability::DeleteObject, |b| b.as_delete_object())
    }

    pub fn move_object(&self) -> Result<&dyn MoveObject> {
        self.gated(Capability::MoveObject, |b| b.as_move_object())
    }

    pub fn get_in_period(&self) -> Result<&dyn GetInPeriod> {
        self.gated(Capability::GetInPeriod, |b| b.as_get_in_period())
    }

    pub fn get_by_type(&self) -> Result<&dyn GetByType> {
        self.gated(Capability::GetObjectByType, |b| b.as_get_by_type())
    }

    pub fn get_in_period_by_type(&self) -> Result<&dyn GetInPeriodByType> {
        self.gated(Capability::GetInPeriodByType, |b| b.as_get_in_period_by_type())
    }
}

/// Ordered set of registered backends.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    entries: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend.
    ///
    /// A backend whose id is already registered replaces the earlier entry
    /// and keeps its position in the iteration order.
    pub fn register(&mut self, backend: Arc<dyn CalendarBackend>) -> &BackendDescriptor {
        let descriptor = BackendDescriptor::new(backend);
        info!(
            backend_id = %descriptor.id,
            capabilities = %descriptor.capabilities,
            "registering calendar backend"
        );

        let index = match self.position(&descriptor.id) {
            Some(index) => {
                debug!(backend_id = %descriptor.id, "replacing previously registered backend");
                self.entries[index] = descriptor;
                index
            }
            None => {
                self.entries.push(descriptor);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn CalendarBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Descriptors in registration order.
    #[must_use]
    pub fn all(&self) -> &[BackendDescriptor] {
        &self.entries
    }

    pub fn find(&self, id: &BackendId) -> Result<&BackendDescriptor> {
        self.find_ranked(id).map(|(_, descriptor)| descriptor)
    }

    /// Descriptor and its registration rank.
    pub fn find_ranked(&self, id: &BackendId) -> Result<(usize, &BackendDescriptor)> {
        self.position(id)
            .map(|index| (index, &self.entries[index]))
            .ok_or_else(|| AgendumError::BackendUnavailable(format!("no backend registered as '{id}'")))
    }

    /// Backend owning `calendar`.
    pub fn resolve(&self, calendar: &CalendarId) -> Result<&BackendDescriptor> {
        self.find(&calendar.backend)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: &BackendId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }
}

impl CapabilityRegistry for BackendRegistry {
    fn supported_set(&self, backend: &BackendId) -> Result<CapabilitySet> {
        self.find(backend).map(BackendDescriptor::capabilities)
    }
}
