//! Backend registration and capability discovery

pub mod capabilities;
pub mod registry;

pub use capabilities::{probe, CapabilityRegistry};
pub use registry::{BackendDescriptor, BackendRegistry};
