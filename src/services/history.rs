use actix_web::web;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc, oid::ObjectId};
use std::sync::{Arc, Mutex};

use crate::db::kv_store::KeyValueStore;
use crate::error::AppError;
use crate::models::history_item::{HistoryItem, LocalHistoryRecord, NewHistoryEntry};
use crate::models::qr_code::QrCodeRecord;

/// Key of the local collection.
pub const HISTORY_KEY: &str = "qr-history";

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Record a new entry with a fresh id and the current time; returns the stored item.
    async fn save(&self, entry: NewHistoryEntry) -> Result<HistoryItem, AppError>;
    /// Every item, most recent first.
    async fn list(&self) -> Result<Vec<HistoryItem>, AppError>;
    /// Remove one item. Unknown ids are not an error.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

/// Bounded history kept under one key of a [`KeyValueStore`], rewritten in
/// full on every change.
#[derive(Clone)]
pub struct LocalHistory {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
    // Serializes read-modify-write cycles on the collection
    write_lock: Arc<Mutex<()>>,
}

impl LocalHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn load(&self) -> Result<Vec<LocalHistoryRecord>, AppError> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("Discarding unreadable local history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn store_all(&self, records: &[LocalHistoryRecord]) -> Result<(), AppError> {
        let raw = serde_json::to_string(records)?;
        self.store.put(HISTORY_KEY, &raw)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, AppError> {
        self.write_lock
            .lock()
            .map_err(|_| AppError::Internal("history lock poisoned".to_string()))
    }

    // The store may touch the filesystem, so run against it on the blocking pool
    async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&LocalHistory) -> Result<T, AppError> + Send + 'static,
    {
        let history = self.clone();
        web::block(move || f(&history))
            .await
            .map_err(|e| AppError::Internal(format!("local history task failed: {}", e)))?
    }
}

#[async_trait]
impl HistoryStore for LocalHistory {
    async fn save(&self, entry: NewHistoryEntry) -> Result<HistoryItem, AppError> {
        self.blocking(move |history| {
            let _guard = history.lock()?;
            let mut records = history.load()?;
            let record = LocalHistoryRecord::new(entry.scheme, entry.payload);
            records.insert(0, record.clone());
            records.truncate(history.capacity);
            history.store_all(&records)?;
            log::info!("Saved {} code {} to local history", record.scheme, record.id);
            Ok(record.into())
        })
        .await
    }

    async fn list(&self) -> Result<Vec<HistoryItem>, AppError> {
        self.blocking(|history| Ok(history.load()?.into_iter().map(HistoryItem::from).collect()))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = id.to_string();
        self.blocking(move |history| {
            let _guard = history.lock()?;
            let mut records = history.load()?;
            let before = records.len();
            records.retain(|record| record.id != id);
            if records.len() != before {
                history.store_all(&records)?;
                log::info!("Deleted {} from local history", id);
            }
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.blocking(|history| {
            let _guard = history.lock()?;
            history.store_all(&[])
        })
        .await
    }
}

// Newest first; `_id` breaks ties between codes saved in the same millisecond
fn newest_first() -> Document {
    doc! { "created_at": -1, "_id": -1 }
}

/// One owner's view of the remote collection.
pub struct RemoteHistory {
    collection: Collection<QrCodeRecord>,
    owner: String,
}

impl RemoteHistory {
    pub fn new(collection: Collection<QrCodeRecord>, owner: impl Into<String>) -> Self {
        Self {
            collection,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl HistoryStore for RemoteHistory {
    async fn save(&self, entry: NewHistoryEntry) -> Result<HistoryItem, AppError> {
        let mut record = QrCodeRecord::new(self.owner.clone(), entry);
        let result = self.collection.insert_one(&record).await?;
        record.id = result.inserted_id.as_object_id();
        log::info!("Saved {} code for owner {}", record.scheme, self.owner);
        Ok(record.into())
    }

    async fn list(&self) -> Result<Vec<HistoryItem>, AppError> {
        let records = self
            .collection
            .find(doc! { "owner": &self.owner })
            .sort(newest_first())
            .await?
            .try_collect::<Vec<QrCodeRecord>>()
            .await?;
        Ok(records.into_iter().map(HistoryItem::from).collect())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::InvalidRequest("Invalid QR code ID format".to_string()))?;
        let result = self
            .collection
            .delete_one(doc! { "_id": object_id, "owner": &self.owner })
            .await?;
        log::info!(
            "Deleted {} remote code(s) with id {} for owner {}",
            result.deleted_count,
            id,
            self.owner
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let result = self
            .collection
            .delete_many(doc! { "owner": &self.owner })
            .await?;
        log::info!("Cleared {} remote codes for owner {}", result.deleted_count, self.owner);
        Ok(())
    }
}
