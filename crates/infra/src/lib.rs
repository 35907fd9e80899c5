//! # Agendum Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The RFC 5545 calendar codec
//! - An in-memory calendar backend
//! - Configuration loading (environment, JSON, TOML)
//! - Logging initialisation and error conversions
//!
//! ## Architecture
//! - Implements traits defined in `agendum-core`
//! - Contains all "impure" code (I/O, process environment, global subscriber)

pub mod backends;
pub mod codec;
pub mod config;
pub mod errors;
pub mod observability;

// Re-export commonly used items
pub use backends::MemoryBackend;
pub use codec::ICalendarCodec;
pub use errors::InfraError;
pub use observability::init_tracing;
