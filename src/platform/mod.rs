//! Narrow stand-ins for the browser capabilities the gallery depends on:
//! key/value storage, file reading, image decoding, fullscreen and time.

pub mod clock;
pub mod error;
pub mod fullscreen;
pub mod image_loader;
pub mod reader;
pub mod store;

pub use clock::{Clock, DynClock, MonotonicClock, SystemClock};
pub use error::{FullscreenError, ImageLoadError, StorageError};
pub use fullscreen::{
    ClientFullscreen, DynFullscreen, Element, FullscreenController, FullscreenRequest,
    SimulatedFullscreen,
};
pub use image_loader::{
    DataUrlImageLoader, DynImageLoader, ImageLoader, LoadedImage, decode_data_url,
    encode_data_url,
};
pub use reader::{DynFileReader, FileReader, FileSource, LocalFileReader, SelectedFile};
pub use store::{DynStore, FileStore, KeyValueStore, MemoryStore};
