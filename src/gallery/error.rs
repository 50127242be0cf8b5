use crate::platform::StorageError;
use crate::ui::AuthError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Template error: {0}")]
    Template(String),
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GalleryError::Storage(StorageError::QuotaExceeded { .. }) => {
                (StatusCode::INSUFFICIENT_STORAGE, "Storage quota exceeded")
            }
            GalleryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage error"),
            GalleryError::Auth(AuthError::PasswordMismatch) => {
                (StatusCode::BAD_REQUEST, "Passwords do not match!")
            }
            GalleryError::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error"),
            GalleryError::Upload(_) => (StatusCode::BAD_REQUEST, "Invalid upload"),
            GalleryError::Template(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        if status.is_server_error() {
            error!("{}", self);
        }
        (status, message).into_response()
    }
}
