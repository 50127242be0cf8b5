use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {requested} bytes requested, {quota} bytes allowed")]
    QuotaExceeded { requested: usize, quota: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage document error: {0}")]
    Document(String),
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Not an embeddable image source")]
    NotDataUrl,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("SVG parse failed: {0}")]
    Svg(#[from] usvg::Error),

    #[error("Decode task aborted")]
    Aborted,
}

#[derive(Debug, Error)]
pub enum FullscreenError {
    #[error("Fullscreen is not supported in this environment")]
    Unsupported,

    #[error("Fullscreen request denied")]
    Denied,
}
