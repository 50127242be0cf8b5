use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// One entry of a user file selection, the equivalent of a browser `File`.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Declared content type, when the environment supplied one.
    pub content_type: Option<String>,
    /// Path relative to the selected folder, present in folder-mode selections.
    pub relative_path: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub source: FileSource,
}

#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Arc<[u8]>),
    Path(PathBuf),
}

impl SelectedFile {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: Option<String>,
        relative_path: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type,
            relative_path,
            last_modified: Utc::now(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes.into()),
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Builds a folder-mode selection from every file beneath `root`.
    ///
    /// Relative paths start with the root folder's own name, the way a
    /// directory picker reports them.
    pub fn from_directory(root: &Path) -> std::io::Result<Vec<SelectedFile>> {
        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(std::io::Error::other)?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Ok(inner) = entry.path().strip_prefix(root) else {
                continue;
            };
            let inner = inner
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            let relative_path = if root_name.is_empty() {
                inner
            } else {
                format!("{}/{}", root_name, inner)
            };

            let last_modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(SelectedFile {
                name,
                content_type: None,
                relative_path: Some(relative_path),
                last_modified,
                size: metadata.len(),
                source: FileSource::Path(entry.path().to_path_buf()),
            });
        }

        debug!("Selected {} files from {:?}", files.len(), root);
        Ok(files)
    }
}

/// Reads the full content of a selected file.
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read(&self, file: &SelectedFile) -> std::io::Result<Vec<u8>>;
}

pub type DynFileReader = Arc<dyn FileReader>;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileReader;

#[async_trait]
impl FileReader for LocalFileReader {
    async fn read(&self, file: &SelectedFile) -> std::io::Result<Vec<u8>> {
        match &file.source {
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
            FileSource::Path(path) => tokio::fs::read(path).await,
        }
    }
}
