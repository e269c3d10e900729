use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored endpoint, as stored in the `targets` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDraft {
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Convert a wall-clock timestamp to the unix seconds stored in the table.
pub(crate) fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

/// Convert stored unix seconds back to a wall-clock timestamp.
pub(crate) fn i64_to_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
