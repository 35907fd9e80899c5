//! Backend capabilities and the bitmask set that carries them.
//!
//! Bit values are fixed: they are part of the wire contract with existing
//! backends and consumers that exchange capability masks as plain integers.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Optional operation a backend may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create a new calendar.
    CreateCalendar,
    /// Rename a calendar or change its flags.
    EditCalendar,
    /// Remove a calendar with its objects.
    DeleteCalendar,
    /// Mark a calendar as changed without editing it.
    TouchCalendar,
    /// Move all objects of one calendar into another.
    MergeCalendar,
    /// Store a new object.
    CreateObject,
    /// Replace a stored object.
    EditObject,
    /// Remove a stored object.
    DeleteObject,
    /// Return only objects occurring in a period.
    GetInPeriod,
    /// Move an object between calendars.
    MoveObject,
    /// Return only objects of one component type.
    GetObjectByType,
    /// Period and component type filtering combined.
    GetInPeriodByType,
}

crate::impl_domain_enum_conversions!(Capability {
    CreateCalendar => "create_calendar",
    EditCalendar => "edit_calendar",
    DeleteCalendar => "delete_calendar",
    TouchCalendar => "touch_calendar",
    MergeCalendar => "merge_calendar",
    CreateObject => "create_object",
    EditObject => "edit_object",
    DeleteObject => "delete_object",
    GetInPeriod => "get_in_period",
    MoveObject => "move_object",
    GetObjectByType => "get_object_by_type",
    GetInPeriodByType => "get_in_period_by_type",
});

impl Capability {
    /// Bit assigned to this capability in a [`CapabilitySet`].
    #[must_use]
    pub const fn bit(self) -> u64 {
        match self {
            Self::CreateCalendar => 0x0000_0000_0000_0001,
            Self::EditCalendar => 0x0000_0000_0000_0010,
            Self::DeleteCalendar => 0x0000_0000_0000_0100,
            Self::TouchCalendar => 0x0000_0000_0000_1000,
            Self::MergeCalendar => 0x0000_0000_0001_0000,
            Self::CreateObject => 0x0000_0000_0010_0000,
            Self::EditObject => 0x0000_0000_0100_0000,
            Self::DeleteObject => 0x0000_0000_1000_0000,
            Self::GetInPeriod => 0x0000_0001_0000_0000,
            Self::MoveObject => 0x0000_0010_0000_0000,
            Self::GetObjectByType => 0x0000_0100_0000_0000,
            Self::GetInPeriodByType => 0x0000_1000_0000_0000,
        }
    }
}

/// Immutable set of capabilities, stored as the legacy bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(u64);

impl CapabilitySet {
    /// The set with no capability.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from a raw mask. Bits that do not belong to any
    /// capability are dropped.
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        let known = Capability::variants().iter().fold(0, |acc, cap| acc | cap.bit());
        Self(bits & known)
    }

    /// The set as the legacy integer mask.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True when `capability` is present.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// True when every capability of `other` is present.
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when at least one capability of `mask` is present.
    #[must_use]
    pub const fn intersects(self, mask: Self) -> bool {
        self.0 & mask.0 != 0
    }

    /// This set plus `capability`.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// True when no capability is present.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of capabilities present.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Capabilities in declaration order.
    #[must_use]
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::variants().iter().copied().filter(move |cap| self.contains(*cap))
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        Self(capability.bit())
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl BitOr for CapabilitySet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<Capability> for CapabilitySet {
    type Output = Self;

    fn bitor(self, rhs: Capability) -> Self {
        self.with(rhs)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|cap| cap.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
