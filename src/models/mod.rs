//! Game-Data Models
//!
//! Payload types held by the named caches. The cache layer treats them as
//! opaque; only the services look inside.
//!
//! Localized and free-form fields (`name_i18n`, `existence`, ...) are kept as
//! raw JSON values.

pub mod shims;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Item as served by the admin API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "id")]
    pub item_id: i64,
    pub ark_item_id: String,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub existence: Value,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub sort_id: i64,
    #[serde(default)]
    pub rarity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default)]
    pub keywords: Value,
}

/// Body of `GET /cli/gamedata/seed`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliGameDataSeedResponse {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Stage of a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(rename = "id")]
    pub stage_id: i64,
    pub ark_stage_id: String,
    pub zone_id: i64,
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub sanity: Option<i64>,
    #[serde(default)]
    pub existence: Value,
    #[serde(default)]
    pub min_clear_time: Option<i64>,
}

/// Zone grouping a set of stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(rename = "id")]
    pub zone_id: i64,
    pub ark_zone_id: String,
    #[serde(default)]
    pub index: i64,
    pub category: String,
    #[serde(default, rename = "type")]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub existence: Value,
    #[serde(default)]
    pub background: Option<String>,
}

/// Window during which a drop configuration applies on one server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    #[serde(rename = "id")]
    pub range_id: i64,
    pub server: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TimeRange {
    /// Check if `at` falls within `[start_time, end_time)`
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at < self.end_time
    }
}

/// Site notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(rename = "id")]
    pub notice_id: i64,
    #[serde(default)]
    pub existence: Value,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default, rename = "content_i18n")]
    pub content: Value,
}

/// In-game event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "id")]
    pub activity_id: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub existence: Value,
}

/// Drop bounds for one item on one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub upper: i64,
    pub lower: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<i64>,
}

/// Drop configuration of an item on a stage within a time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropInfo {
    #[serde(rename = "id")]
    pub drop_id: i64,
    pub server: String,
    pub stage_id: i64,
    pub item_id: Option<i64>,
    pub drop_type: String,
    pub range_id: i64,
    pub accumulable: bool,
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
}

// =============================================================================
// Tests
// =============================================================================
