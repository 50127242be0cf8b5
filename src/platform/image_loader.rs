use super::ImageLoadError;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
}

/// Decodes an image source the way an off-screen `Image` element would.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, src: &str) -> Result<LoadedImage, ImageLoadError>;
}

pub type DynImageLoader = Arc<dyn ImageLoader>;

/// Splits `data:<mime>;base64,<payload>` into its mime type and raw bytes.
pub fn decode_data_url(src: &str) -> Result<(String, Vec<u8>), ImageLoadError> {
    let rest = src.strip_prefix("data:").ok_or(ImageLoadError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageLoadError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ImageLoadError::NotDataUrl)?;
    let bytes = general_purpose::STANDARD.decode(payload)?;
    Ok((mime.to_string(), bytes))
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    )
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DataUrlImageLoader;

impl DataUrlImageLoader {
    fn decode(src: &str) -> Result<LoadedImage, ImageLoadError> {
        let (mime, bytes) = decode_data_url(src)?;

        if mime == "image/svg+xml" {
            let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default())?;
            let size = tree.size();
            return Ok(LoadedImage {
                width: size.width().ceil() as u32,
                height: size.height().ceil() as u32,
            });
        }

        let img = image::load_from_memory(&bytes)?;
        Ok(LoadedImage {
            width: img.width(),
            height: img.height(),
        })
    }
}

#[async_trait]
impl ImageLoader for DataUrlImageLoader {
    async fn load(&self, src: &str) -> Result<LoadedImage, ImageLoadError> {
        let src = src.to_string();
        tokio::task::spawn_blocking(move || Self::decode(&src))
            .await
            .unwrap_or_else(|_| Err(ImageLoadError::Aborted))
    }
}
