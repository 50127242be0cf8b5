use super::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// String key/value storage with the semantics of the browser's Web Storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

pub type DynStore = Arc<dyn KeyValueStore>;

/// Session-scoped store. Lives exactly as long as the value itself.
///
/// With a quota set, a write that would push the summed byte length of all
/// keys and values past it fails with [`StorageError::QuotaExceeded`] and the
/// previous value is kept.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    pub async fn used_bytes(&self) -> usize {
        let items = self.items.read().await;
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.items.write().await;

        if let Some(quota) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = others + key.len() + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded { requested, quota });
            }
        }

        items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

/// Durable store backed by a TOML document on disk, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
    items: RwLock<HashMap<String, String>>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = if tokio::fs::try_exists(&path).await? {
            let contents = tokio::fs::read_to_string(&path).await?;
            let doc = contents
                .parse::<toml_edit::DocumentMut>()
                .map_err(|e| StorageError::Document(e.to_string()))?;
            let items: HashMap<String, String> = toml_edit::de::from_document(doc)
                .map_err(|e| StorageError::Document(e.to_string()))?;
            debug!("Loaded {} entries from {:?}", items.len(), path);
            items
        } else {
            info!("Local storage file {:?} not found, starting empty", path);
            HashMap::new()
        };

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, items: &HashMap<String, String>) -> Result<(), StorageError> {
        let mut doc = toml_edit::DocumentMut::new();
        let mut keys: Vec<_> = items.keys().collect();
        keys.sort();
        for key in keys {
            doc[key.as_str()] = toml_edit::value(items[key].as_str());
        }
        tokio::fs::write(&self.path, doc.to_string()).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.items.write().await;
        items.insert(key.to_string(), value);
        self.persist(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().await;
        if items.remove(key).is_some() {
            self.persist(&items).await?;
        }
        Ok(())
    }
}
