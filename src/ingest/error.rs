use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No files chosen.")]
    NoFilesChosen,

    #[error("No image files found in the selection.")]
    EmptySelection,

    #[error("Failed to read {name}: {source}")]
    ReadFailure {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
