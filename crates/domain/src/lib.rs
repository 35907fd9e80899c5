//! # Agendum Domain
//!
//! Business domain types for Agendum.
//!
//! This crate contains:
//! - Capability, backend and calendar identities
//! - Periods, parsed events, raw calendar objects and occurrences
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other Agendum crates
//! - Pure data structures; no I/O and no timezone database

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
