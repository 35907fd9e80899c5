//! Shared test helpers for `agendum-core` integration tests.
//!
//! Lightweight backends, a JSON-backed codec and a collecting failure sink so
//! query tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod calendar;
pub mod codec;

use chrono::{DateTime, TimeZone, Utc};

pub use calendar::MockCalendarBackend;
pub use codec::{CollectingFailureSink, JsonCodec, StallingCodec};

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}
