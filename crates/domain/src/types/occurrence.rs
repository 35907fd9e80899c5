//! Query output records

use serde::{Deserialize, Serialize};

use super::calendar::ObjectId;

/// One concrete instance of an event inside the queried period.
///
/// `start`/`end` are `YYYY-MM-DD` for all-day occurrences and
/// `YYYY-MM-DD HH:MM:SS` in the target zone otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub object_id: ObjectId,
    pub title: String,
    pub description: String,
    pub last_modified: i64,
    pub all_day: bool,
    pub start: String,
    pub end: String,
}
