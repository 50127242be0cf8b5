use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::{collections::HashMap, path::PathBuf, sync::Arc, time::UNIX_EPOCH};
use tokio::{fs::File, sync::RwLock};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info};

/// Serves the stylesheet and page script, with mtime-based cache busting.
#[derive(Clone)]
pub struct StaticFileHandler {
    pub static_dir: PathBuf,
    file_versions: Arc<RwLock<HashMap<String, u64>>>,
}

impl StaticFileHandler {
    pub async fn new(static_dir: PathBuf) -> Self {
        let handler = Self {
            static_dir,
            file_versions: Arc::new(RwLock::new(HashMap::new())),
        };
        handler.refresh_file_versions().await;
        handler
    }

    pub async fn refresh_file_versions(&self) {
        info!("Refreshing static file versions");
        let mut versions = self.file_versions.write().await;
        versions.clear();

        let Ok(mut entries) = tokio::fs::read_dir(&self.static_dir).await else {
            debug!("No static directory at {:?}", self.static_dir);
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if let Ok(metadata) = entry.metadata().await
                && metadata.is_file()
                && let Some(ext) = path.extension()
                && (ext == "css" || ext == "js")
                && let Ok(modified) = metadata.modified()
                && let Ok(duration) = modified.duration_since(UNIX_EPOCH)
                && let Some(file_name) = path.file_name().and_then(|n| n.to_str())
            {
                versions.insert(file_name.to_string(), duration.as_secs());
                debug!("File version: {} -> {}", file_name, duration.as_secs());
            }
        }
    }

    /// `/static/<name>`, suffixed with `?v=<mtime>` when the file is known.
    pub async fn versioned_url(&self, name: &str) -> String {
        match self.file_versions.read().await.get(name) {
            Some(version) => format!("/static/{}?v={}", name, version),
            None => format!("/static/{}", name),
        }
    }

    pub async fn serve(&self, path: &str, has_version: bool) -> Response {
        if path.split('/').any(|segment| segment == "..") {
            error!("Path traversal attempt: {:?}", path);
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }
        let file_path = self.static_dir.join(path.trim_start_matches('/'));

        debug!("Attempting to serve static file: {:?}", file_path);

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return (StatusCode::NOT_FOUND, "File not found").into_response(),
            Err(e) => {
                debug!("Failed to get metadata for {:?}: {}", file_path, e);
                return (StatusCode::NOT_FOUND, "File not found").into_response();
            }
        };

        let file = match File::open(&file_path).await {
            Ok(file) => file,
            Err(e) => {
                debug!("Failed to open file {:?}: {}", file_path, e);
                return (StatusCode::NOT_FOUND, "File not found").into_response();
            }
        };

        let content_type = mime_guess::from_path(&file_path)
            .first_or_octet_stream()
            .to_string();

        let cache_control = if has_version {
            "public, max-age=31536000, immutable"
        } else {
            "public, max-age=300, must-revalidate"
        };

        let mut response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, cache_control);

        if let Ok(modified) = metadata.modified()
            && let Ok(duration) = modified.duration_since(UNIX_EPOCH)
        {
            let http_date = httpdate::fmt_http_date(modified);
            response = response.header(header::LAST_MODIFIED, http_date);

            let etag = format!("\"{}-{}\"", duration.as_secs(), metadata.len());
            response = response.header(header::ETAG, etag);
        }

        match response.body(Body::from_stream(ReaderStream::new(file))) {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to build static response: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
