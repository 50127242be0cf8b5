mod core;
mod error;

pub use core::{IngestOutcome, Ingestor, folder_label, is_image_file};
pub use error::IngestError;
