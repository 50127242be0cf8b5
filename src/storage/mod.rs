//! Session persistence of the Record Set and the selected-album handoff.

use crate::gallery::ImageRecord;
use crate::platform::{DynStore, StorageError};
use tracing::{debug, warn};

pub const DEFAULT_RECORDS_KEY: &str = "mg_images_v1";
pub const DEFAULT_SELECTED_ALBUM_KEY: &str = "selectedAlbum";

#[derive(Clone)]
pub struct RecordStore {
    store: DynStore,
    records_key: String,
    selected_album_key: String,
}

impl RecordStore {
    pub fn new(store: DynStore) -> Self {
        Self::with_keys(store, DEFAULT_RECORDS_KEY, DEFAULT_SELECTED_ALBUM_KEY)
    }

    pub fn with_keys(
        store: DynStore,
        records_key: impl Into<String>,
        selected_album_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            records_key: records_key.into(),
            selected_album_key: selected_album_key.into(),
        }
    }

    /// Loads the stored Record Set. Missing or unreadable data is an empty set.
    pub async fn load(&self) -> Vec<ImageRecord> {
        let stored = match self.store.get_item(&self.records_key).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read stored images: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ImageRecord>>(&stored) {
            Ok(records) => {
                debug!("Loaded {} stored images", records.len());
                records
            }
            Err(e) => {
                warn!("Could not load existing images, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrites the stored Record Set with `records`.
    pub async fn save(&self, records: &[ImageRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)?;
        self.store.set_item(&self.records_key, json).await
    }

    pub async fn selected_album(&self) -> Option<String> {
        match self.store.get_item(&self.selected_album_key).await {
            Ok(album) => album,
            Err(e) => {
                warn!("Could not read selected album: {}", e);
                None
            }
        }
    }

    pub async fn set_selected_album(&self, label: &str) -> Result<(), StorageError> {
        self.store
            .set_item(&self.selected_album_key, label.to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{KeyValueStore, MemoryStore};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn record(name: &str) -> ImageRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ImageRecord {
            src: "data:image/png;base64,AA==".to_string(),
            name: name.to_string(),
            caption: name.to_string(),
            date_added: at,
            last_modified: at,
            size: 1,
            folder_name: "Trip".to_string(),
            path: format!("Trip/{}", name),
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = RecordStore::new(Arc::new(MemoryStore::new()));
        store.save(&[record("a.jpg"), record("b.png")]).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].name, "b.png");
    }

    #[tokio::test]
    async fn test_corrupt_data_is_empty() {
        let backing = Arc::new(MemoryStore::new());
        backing
            .set_item(DEFAULT_RECORDS_KEY, "{not json".to_string())
            .await
            .unwrap();

        let store = RecordStore::new(backing);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_stored_json_uses_camel_case_keys() {
        let backing = Arc::new(MemoryStore::new());
        let store = RecordStore::new(backing.clone());
        store.save(&[record("a.jpg")]).await.unwrap();

        let raw = backing.get_item(DEFAULT_RECORDS_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"dateAdded\""));
        assert!(raw.contains("\"folderName\":\"Trip\""));
    }

    #[tokio::test]
    async fn test_selected_album_handoff() {
        let store = RecordStore::new(Arc::new(MemoryStore::new()));
        assert!(store.selected_album().await.is_none());
        store.set_selected_album("Trip").await.unwrap();
        assert_eq!(store.selected_album().await.as_deref(), Some("Trip"));
    }
}
