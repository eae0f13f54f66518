use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::history_item::{HistoryItem, NewHistoryEntry, SavedDetails};
use crate::models::scheme::SchemeType;
use crate::structs::render_config::ErrorCorrection;

/// A saved code in the remote `qr_codes` collection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrCodeRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner: String,   // Subject of the token that saved it
    pub name: String,    // Display name shown in the history list
    #[serde(rename = "type")]
    pub scheme: SchemeType,
    pub content: String, // The encoded payload
    pub fg_color: String,
    pub bg_color: String,
    pub level: ErrorCorrection,
    pub created_at: i64, // When the code was saved (timestamp in milliseconds)
}

impl QrCodeRecord {
    pub fn new(owner: String, entry: NewHistoryEntry) -> Self {
        Self {
            id: None,
            owner,
            name: entry.name,
            scheme: entry.scheme,
            content: entry.payload,
            fg_color: entry.foreground,
            bg_color: entry.background,
            level: entry.level,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl From<QrCodeRecord> for HistoryItem {
    fn from(record: QrCodeRecord) -> Self {
        Self {
            id: record.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            scheme: record.scheme,
            payload: record.content,
            created_at: record.created_at,
            details: Some(SavedDetails {
                owner: record.owner,
                name: record.name,
                foreground: record.fg_color,
                background: record.bg_color,
                level: record.level,
            }),
        }
    }
}
