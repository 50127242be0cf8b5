// Gallery module - Main entry point
mod albums;
mod error;
mod handlers;
mod pagination;
mod session;
mod types;

// Re-export public items
pub use albums::{album_cards, group_albums};
pub use error::GalleryError;
pub use handlers::{
    AlbumSelection, FolderUpload, LAST_MODIFIED_FIELD, SELECT_ALBUM_PATH, albums_handler,
    ingest_handler, lightbox_event_handler, lightbox_state_handler, next_page_handler,
    pictures_handler, previous_page_handler, select_album_handler,
};
pub use pagination::{PaginationCursor, controls, page_slice, render_page, sort_newest_first};
pub use session::{
    GallerySession, PROCESSING_MESSAGE, READ_FAILURE_MESSAGE, STORAGE_WARNING,
};
pub use types::*;

use std::sync::Arc;

pub type SharedSession = Arc<GallerySession>;
