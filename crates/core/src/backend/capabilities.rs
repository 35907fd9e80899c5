//! Capability discovery
//!
//! A backend's capability set is derived from the optional-operation
//! accessors it overrides. Probing happens once, when the backend is wrapped
//! in a [`BackendDescriptor`](super::BackendDescriptor); afterwards only the
//! frozen set is consulted.

use agendum_domain::{BackendId, Capability, CapabilitySet, Result};

use crate::calendar_ports::CalendarBackend;

/// Compute the capability set of `backend` from its accessors.
#[must_use]
pub fn probe(backend: &dyn CalendarBackend) -> CapabilitySet {
    let provided = [
        (Capability::CreateCalendar, backend.as_create_calendar().is_some()),
        (Capability::EditCalendar, backend.as_edit_calendar().is_some()),
        (Capability::DeleteCalendar, backend.as_delete_calendar().is_some()),
        (Capability::TouchCalendar, backend.as_touch_calendar().is_some()),
        (Capability::MergeCalendar, backend.as_merge_calendar().is_some()),
        (Capability::CreateObject, backend.as_create_object().is_some()),
        (Capability::EditObject, backend.as_edit_object().is_some()),
        (Capability::DeleteObject, backend.as_delete_object().is_some()),
        (Capability::GetInPeriod, backend.as_get_in_period().is_some()),
        (Capability::MoveObject, backend.as_move_object().is_some()),
        (Capability::GetObjectByType, backend.as_get_by_type().is_some()),
        (Capability::GetInPeriodByType, backend.as_get_in_period_by_type().is_some()),
    ];

    provided.into_iter().filter(|(_, present)| *present).map(|(capability, _)| capability).collect()
}

/// Capability queries by backend id.
///
/// Looking up an id that was never registered fails with
/// `BackendUnavailable`.
pub trait CapabilityRegistry {
    fn supported_set(&self, backend: &BackendId) -> Result<CapabilitySet>;

    fn supports(&self, backend: &BackendId, capability: Capability) -> Result<bool> {
        Ok(self.supported_set(backend)?.contains(capability))
    }

    /// True when the backend supports at least one capability of `mask`.
    fn implements_any(&self, backend: &BackendId, mask: CapabilitySet) -> Result<bool> {
        Ok(self.supported_set(backend)?.intersects(mask))
    }

    /// The supported set as the legacy integer bitmask.
    fn supported_actions(&self, backend: &BackendId) -> Result<u64> {
        Ok(self.supported_set(backend)?.bits())
    }
}
