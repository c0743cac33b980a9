//! Frontend-compatible ("shim") views of the game-data models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Item as exposed to the v2 frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip)]
    pub item_id: i64,
    pub ark_item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "name_i18n")]
    pub name_i18n: Value,
    #[serde(default)]
    pub existence: Value,
    #[serde(default)]
    pub sort_id: i64,
    #[serde(default)]
    pub rarity: i64,
    #[serde(default)]
    pub item_type: String,
}

/// Stage as exposed to the v2 frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(skip)]
    pub stage_id: i64,
    #[serde(rename = "stageId")]
    pub ark_stage_id: String,
    #[serde(rename = "zoneId")]
    pub ark_zone_id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "code_i18n")]
    pub code_i18n: Value,
    #[serde(default, rename = "apCost")]
    pub sanity: Option<i64>,
    #[serde(default)]
    pub existence: Value,
}

/// Zone as exposed to the v2 frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(skip)]
    pub zone_id: i64,
    #[serde(rename = "zoneId")]
    pub ark_zone_id: String,
    #[serde(rename = "zoneIndex")]
    pub index: i64,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default, rename = "subType")]
    pub zone_type: Option<String>,
    #[serde(default, rename = "zoneName")]
    pub zone_name: String,
    #[serde(default, rename = "zoneName_i18n")]
    pub zone_name_i18n: Value,
    #[serde(default)]
    pub existence: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, rename = "stages")]
    pub stage_ids: Vec<String>,
}

/// Activity as exposed to the v2 frontend; times are epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(skip)]
    pub activity_id: i64,
    pub start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default, rename = "label_i18n")]
    pub label_i18n: Value,
    #[serde(default)]
    pub existence: Value,
}
