use super::IngestError;
use crate::gallery::ImageRecord;
use crate::platform::{DynClock, DynFileReader, SelectedFile, StorageError, encode_data_url};
use crate::storage::RecordStore;
use futures::future::try_join_all;
use std::path::Path as StdPath;
use tracing::{debug, error, info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "svg", "webp"];

/// Result of a successful ingestion batch.
#[derive(Debug)]
pub struct IngestOutcome {
    /// The merged Record Set, existing records first.
    pub records: Vec<ImageRecord>,
    pub added: usize,
    /// Folder label of the newest record of the batch.
    pub folder_name: String,
    /// Set when the merged set could not be written back. The records above
    /// are still the ones to display.
    pub storage_error: Option<StorageError>,
}

impl IngestOutcome {
    pub fn summary(&self) -> String {
        format!(
            "Added {} images from '{}'. Total: {} images",
            self.added,
            self.folder_name,
            self.records.len()
        )
    }
}

pub fn is_image_file(file: &SelectedFile) -> bool {
    let declared = file
        .content_type
        .as_deref()
        .map(|t| t.to_lowercase().starts_with("image/"))
        .unwrap_or(false);

    declared
        || StdPath::new(&file.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
}

/// First segment of a folder-mode relative path, or `default` when the
/// selection carried no folder structure.
pub fn folder_label(relative_path: Option<&str>, default: &str) -> String {
    relative_path
        .and_then(|p| p.split_once('/'))
        .map(|(first, _)| first)
        .filter(|first| !first.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn mime_type_for(file: &SelectedFile) -> String {
    match file.content_type.as_deref() {
        Some(declared) if !declared.is_empty() => declared.to_string(),
        _ => mime_guess::from_path(&file.name)
            .first_or_octet_stream()
            .to_string(),
    }
}

pub struct Ingestor {
    store: RecordStore,
    reader: DynFileReader,
    clock: DynClock,
    default_album: String,
}

impl Ingestor {
    pub fn new(
        store: RecordStore,
        reader: DynFileReader,
        clock: DynClock,
        default_album: impl Into<String>,
    ) -> Self {
        Self {
            store,
            reader,
            clock,
            default_album: default_album.into(),
        }
    }

    pub fn default_album(&self) -> &str {
        &self.default_album
    }

    /// Turns a file selection into records and appends them to the stored set.
    ///
    /// All reads run concurrently; the first failing read aborts the batch
    /// before anything is written.
    pub async fn ingest(&self, files: Vec<SelectedFile>) -> Result<IngestOutcome, IngestError> {
        if files.is_empty() {
            return Err(IngestError::NoFilesChosen);
        }

        let selected = files.len();
        let images: Vec<SelectedFile> = files.into_iter().filter(is_image_file).collect();
        if images.is_empty() {
            warn!("None of the {} selected files is an image", selected);
            return Err(IngestError::EmptySelection);
        }

        info!(
            "Processing {} images out of {} selected files",
            images.len(),
            selected
        );

        let contents = try_join_all(images.iter().map(|file| {
            let reader = &self.reader;
            async move {
                reader
                    .read(file)
                    .await
                    .map_err(|source| IngestError::ReadFailure {
                        name: file.name.clone(),
                        source,
                    })
            }
        }))
        .await
        .inspect_err(|e| error!("Error reading files: {}", e))?;

        let mut batch: Vec<ImageRecord> = images
            .iter()
            .zip(contents)
            .map(|(file, bytes)| self.build_record(file, &bytes))
            .collect();
        batch.sort_by(|a, b| b.date_added.cmp(&a.date_added));

        let added = batch.len();
        let folder_name = batch
            .first()
            .map(|r| r.folder_name.clone())
            .unwrap_or_else(|| self.default_album.clone());

        let mut records = self.store.load().await;
        records.extend(batch);

        let storage_error = match self.store.save(&records).await {
            Ok(()) => None,
            Err(e) => {
                warn!("Could not save {} images to session storage: {}", records.len(), e);
                Some(e)
            }
        };

        debug!("Record Set now holds {} images", records.len());

        Ok(IngestOutcome {
            records,
            added,
            folder_name,
            storage_error,
        })
    }

    fn build_record(&self, file: &SelectedFile, bytes: &[u8]) -> ImageRecord {
        ImageRecord {
            src: encode_data_url(&mime_type_for(file), bytes),
            name: file.name.clone(),
            caption: file.name.clone(),
            date_added: self.clock.now(),
            last_modified: file.last_modified,
            size: file.size,
            folder_name: folder_label(file.relative_path.as_deref(), &self.default_album),
            path: file
                .relative_path
                .clone()
                .unwrap_or_else(|| file.name.clone()),
        }
    }
}
