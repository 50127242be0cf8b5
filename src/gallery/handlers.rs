use super::{GalleryError, album_cards};
use crate::AppState;
use crate::lightbox::LightboxEvent;
use crate::platform::SelectedFile;
use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

pub const SELECT_ALBUM_PATH: &str = "/albums/select";
const GALLERY_ANCHOR: &str = "/pictures#gallery";

#[derive(Debug, Deserialize)]
pub struct AlbumSelection {
    pub name: String,
}

#[axum::debug_handler]
pub async fn pictures_handler(State(app_state): State<AppState>) -> Response {
    let session = &app_state.session;
    let page = session.current_page().await;
    let lightbox = session.lightbox().snapshot().await;

    let globals = liquid::object!({
        "items": page.items,
        "controls": page.controls,
        "total_images": page.total_images,
        "has_images": page.total_images > 0,
        "lightbox": lightbox,
        "selected_album": session.selected_album().await,
    });

    app_state
        .render_html("pictures.html.liquid", "Pictures", globals)
        .await
}

#[axum::debug_handler]
pub async fn next_page_handler(State(app_state): State<AppState>) -> Redirect {
    if !app_state.session.next_page().await {
        debug!("Already on the last page");
    }
    Redirect::to(GALLERY_ANCHOR)
}

#[axum::debug_handler]
pub async fn previous_page_handler(State(app_state): State<AppState>) -> Redirect {
    if !app_state.session.previous_page().await {
        debug!("Already on the first page");
    }
    Redirect::to(GALLERY_ANCHOR)
}

/// Form part carrying a file's modification time, in epoch milliseconds.
/// It applies to the file part that follows it.
pub const LAST_MODIFIED_FIELD: &str = "last_modified";

/// Parts of a folder upload, gathered in arrival order.
#[derive(Debug, Default)]
pub struct FolderUpload {
    files: Vec<SelectedFile>,
    last_modified: Option<DateTime<Utc>>,
}

impl FolderUpload {
    pub fn push_field(&mut self, name: &str, value: &str) {
        if name != LAST_MODIFIED_FIELD {
            return;
        }
        self.last_modified = value
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
        if self.last_modified.is_none() {
            debug!("Ignoring unparsable {}: {:?}", LAST_MODIFIED_FIELD, value);
        }
    }

    /// Adds a file part. Browsers send the folder-relative path as its name.
    pub fn push_file(&mut self, file_name: &str, content_type: Option<&str>, bytes: Vec<u8>) {
        let content_type = content_type
            .filter(|t| *t != "application/octet-stream")
            .map(str::to_string);
        let (name, relative_path) = match file_name.rsplit_once('/') {
            Some((_, name)) => (name.to_string(), Some(file_name.to_string())),
            None => (file_name.to_string(), None),
        };

        let mut file = SelectedFile::from_bytes(name, content_type, relative_path, bytes);
        if let Some(last_modified) = self.last_modified.take() {
            file = file.with_last_modified(last_modified);
        }
        self.files.push(file);
    }

    pub fn into_files(self) -> Vec<SelectedFile> {
        self.files
    }
}

/// Folder upload. Every outcome is reported through a toast.
#[axum::debug_handler]
pub async fn ingest_handler(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, GalleryError> {
    let mut upload = FolderUpload::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.text().await?;
            upload.push_field(&name, &value);
            continue;
        };
        if file_name.is_empty() {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload.push_file(&file_name, content_type.as_deref(), bytes.to_vec());
    }

    let files = upload.into_files();
    info!("Received {} uploaded files", files.len());
    if let Err(e) = app_state.session.ingest_files(files).await {
        debug!("Upload not ingested: {}", e);
    }

    Ok(Redirect::to("/pictures"))
}

#[axum::debug_handler]
pub async fn albums_handler(State(app_state): State<AppState>) -> Response {
    let albums = app_state.session.albums().await;
    let cards = album_cards(&albums, SELECT_ALBUM_PATH);

    let globals = liquid::object!({
        "albums": cards,
        "has_albums": !albums.is_empty(),
    });

    app_state
        .render_html("albums.html.liquid", "Albums", globals)
        .await
}

#[axum::debug_handler]
pub async fn select_album_handler(
    State(app_state): State<AppState>,
    Query(selection): Query<AlbumSelection>,
) -> Result<Redirect, GalleryError> {
    app_state.session.select_album(&selection.name).await?;
    Ok(Redirect::to("/pictures"))
}

#[axum::debug_handler]
pub async fn lightbox_state_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.session.lightbox().snapshot().await)
}

#[axum::debug_handler]
pub async fn lightbox_event_handler(
    State(app_state): State<AppState>,
    Json(event): Json<LightboxEvent>,
) -> impl IntoResponse {
    let lightbox = app_state.session.lightbox();
    let outcome = lightbox.dispatch(event).await;

    Json(serde_json::json!({
        "outcome": outcome,
        "lightbox": lightbox.snapshot().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_last_modified_applies_to_next_file_only() {
        let mut upload = FolderUpload::default();
        upload.push_field(LAST_MODIFIED_FIELD, "1700000000123");
        upload.push_file("Trip/a.png", Some("image/png"), vec![1, 2]);
        upload.push_file("Trip/b.png", Some("image/png"), vec![3]);

        let files = upload.into_files();
        let expected = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(files[0].last_modified, expected);
        assert_ne!(files[1].last_modified, expected);
        assert_eq!(files[0].name, "a.png");
        assert_eq!(files[0].relative_path.as_deref(), Some("Trip/a.png"));
    }

    #[test]
    fn test_unparsable_last_modified_is_ignored() {
        let mut upload = FolderUpload::default();
        upload.push_field(LAST_MODIFIED_FIELD, "yesterday");
        upload.push_field("other", "1700000000123");
        upload.push_file("c.png", Some("application/octet-stream"), vec![1]);

        let files = upload.into_files();
        assert!(files[0].last_modified > Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(files[0].content_type, None);
        assert_eq!(files[0].relative_path, None);
    }
}
