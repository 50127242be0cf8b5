use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested image. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Self-contained image data (`data:` URL).
    pub src: String,
    pub name: String,
    pub caption: String,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    #[serde(default)]
    pub folder_name: String,
    pub path: String,
}

impl ImageRecord {
    /// Folder label, falling back to `default` for records stored without one.
    pub fn album_label<'a>(&'a self, default: &'a str) -> &'a str {
        if self.folder_name.is_empty() {
            default
        } else {
            &self.folder_name
        }
    }
}

/// One visual item of the rendered grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridItem {
    pub index: usize,
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub animation_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationControls {
    pub visible: bool,
    pub current_page: usize,
    pub total_pages: usize,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub items: Vec<GridItem>,
    pub controls: PaginationControls,
    pub total_images: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Album {
    pub name: String,
    pub images: Vec<ImageRecord>,
    pub cover_image: String,
    pub date_added: DateTime<Utc>,
    pub image_count: usize,
}

/// Album summary as shown on the albums page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumCard {
    pub name: String,
    pub cover_image: String,
    pub image_count: usize,
    pub count_label: String,
    pub date_label: String,
    pub select_url: String,
}
