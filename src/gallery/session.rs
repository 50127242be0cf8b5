use super::albums::group_albums;
use super::pagination::{PaginationCursor, render_page};
use super::{Album, ImageRecord, RenderedPage};
use crate::ingest::{IngestError, IngestOutcome, Ingestor, is_image_file};
use crate::lightbox::{Lightbox, LightboxItem};
use crate::platform::{SelectedFile, StorageError};
use crate::storage::RecordStore;
use crate::ui::Notifier;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub const PROCESSING_MESSAGE: &str = "Processing images...";
pub const STORAGE_WARNING: &str = "Warning: Images too large for storage";
pub const READ_FAILURE_MESSAGE: &str = "Failed to read files. Please try again.";

struct SessionState {
    records: Vec<ImageRecord>,
    cursor: PaginationCursor,
    page: RenderedPage,
    // File-input slot; taken by every ingestion attempt.
    pending: Option<Vec<SelectedFile>>,
}

/// State of one open gallery tab: the in-memory Record Set, the cursor, the
/// rendered grid and the lightbox bound to it.
pub struct GallerySession {
    state: RwLock<SessionState>,
    ingestor: Ingestor,
    store: RecordStore,
    lightbox: Lightbox,
    notifier: Notifier,
    // Held from filling the file-input slot until its ingestion ends.
    ingest_lock: Mutex<()>,
}

impl GallerySession {
    pub fn new(
        ingestor: Ingestor,
        store: RecordStore,
        lightbox: Lightbox,
        notifier: Notifier,
        images_per_page: usize,
    ) -> Self {
        let cursor = PaginationCursor::new(images_per_page);
        let page = render_page(&mut [], &cursor);
        Self {
            state: RwLock::new(SessionState {
                records: Vec::new(),
                cursor,
                page,
                pending: None,
            }),
            ingestor,
            store,
            lightbox,
            notifier,
            ingest_lock: Mutex::new(()),
        }
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn default_album(&self) -> &str {
        self.ingestor.default_album()
    }

    /// Reloads the stored Record Set and renders its first page.
    pub async fn restore(&self) -> RenderedPage {
        let records = self.store.load().await;
        info!("Restored {} images from session storage", records.len());
        {
            let mut state = self.state.write().await;
            state.records = records;
            state.cursor.reset();
        }
        self.render().await
    }

    /// Puts a selection in the file-input slot, replacing any earlier one.
    pub async fn select_files(&self, files: Vec<SelectedFile>) {
        debug!("{} files selected", files.len());
        self.state.write().await.pending = Some(files);
    }

    pub async fn has_pending_selection(&self) -> bool {
        self.state.read().await.pending.is_some()
    }

    /// Ingests whatever sits in the file-input slot and clears the slot.
    ///
    /// Every outcome is announced through the notifier. On success the
    /// session shows the merged set from page 1, even when saving it failed.
    pub async fn ingest_selection(&self) -> Result<IngestOutcome, IngestError> {
        let _guard = self.ingest_lock.lock().await;
        self.ingest_pending().await
    }

    /// Selects `files` and ingests them as one step, so concurrent uploads
    /// never pick up each other's selection.
    pub async fn ingest_files(
        &self,
        files: Vec<SelectedFile>,
    ) -> Result<IngestOutcome, IngestError> {
        let _guard = self.ingest_lock.lock().await;
        self.select_files(files).await;
        self.ingest_pending().await
    }

    async fn ingest_pending(&self) -> Result<IngestOutcome, IngestError> {
        let files = self.state.write().await.pending.take().unwrap_or_default();

        if files.iter().any(is_image_file) {
            self.notifier.success(PROCESSING_MESSAGE).await;
        }

        let outcome = match self.ingestor.ingest(files).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = match &e {
                    IngestError::ReadFailure { .. } => READ_FAILURE_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                self.notifier.error(message).await;
                return Err(e);
            }
        };

        if let Some(e) = &outcome.storage_error {
            warn!("Could not save to session storage: {}", e);
            self.notifier.error(STORAGE_WARNING).await;
        }

        {
            let mut state = self.state.write().await;
            state.records = outcome.records.clone();
            state.cursor.reset();
        }
        self.render().await;

        self.notifier.success(outcome.summary()).await;
        Ok(outcome)
    }

    /// Renders the cursor's page and re-binds the lightbox to its items.
    pub async fn render(&self) -> RenderedPage {
        let page = {
            let mut state = self.state.write().await;
            let cursor = state.cursor;
            let page = render_page(&mut state.records, &cursor);
            state.page = page.clone();
            page
        };

        self.lightbox
            .attach(page.items.iter().map(LightboxItem::from))
            .await;
        page
    }

    /// Moves one page forward. Returns false, without re-rendering, on the
    /// last page.
    pub async fn next_page(&self) -> bool {
        let moved = {
            let mut state = self.state.write().await;
            let count = state.records.len();
            state.cursor.next(count)
        };
        if moved {
            self.render().await;
        }
        moved
    }

    pub async fn previous_page(&self) -> bool {
        let moved = self.state.write().await.cursor.previous();
        if moved {
            self.render().await;
        }
        moved
    }

    pub async fn current_page(&self) -> RenderedPage {
        self.state.read().await.page.clone()
    }

    pub async fn records(&self) -> Vec<ImageRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Albums of the stored Record Set, grouped fresh on every call.
    pub async fn albums(&self) -> Vec<Album> {
        let records = self.store.load().await;
        group_albums(&records, self.default_album())
    }

    pub async fn select_album(&self, name: &str) -> Result<(), StorageError> {
        info!("Selected album: {}", name);
        self.store.set_selected_album(name).await
    }

    pub async fn selected_album(&self) -> Option<String> {
        self.store.selected_album().await
    }
}
