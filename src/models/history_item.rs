use serde::{Deserialize, Serialize};

use crate::models::scheme::SchemeType;
use crate::structs::render_config::ErrorCorrection;

/// A saved code as returned by either history store, newest first.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub scheme: SchemeType,
    pub payload: String,
    pub created_at: i64, // Milliseconds since the epoch
    // Only the remote store keeps the owner and styling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SavedDetails>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SavedDetails {
    pub owner: String,
    pub name: String,
    pub foreground: String,
    pub background: String,
    pub level: ErrorCorrection,
}

/// What a session hands to a store on save; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub scheme: SchemeType,
    pub payload: String,
    pub name: String,
    pub foreground: String,
    pub background: String,
    pub level: ErrorCorrection,
}

/// Shape of one entry in the locally persisted collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LocalHistoryRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub scheme: SchemeType,
    pub value: String,
    pub timestamp: i64,
}

impl LocalHistoryRecord {
    pub fn new(scheme: SchemeType, value: String) -> Self {
        Self {
            id: nanoid::nanoid!(),
            scheme,
            value,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl From<LocalHistoryRecord> for HistoryItem {
    fn from(record: LocalHistoryRecord) -> Self {
        Self {
            id: record.id,
            scheme: record.scheme,
            payload: record.value,
            created_at: record.timestamp,
            details: None,
        }
    }
}
