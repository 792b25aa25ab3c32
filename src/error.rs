//! Error taxonomy: open-time container errors are fatal to the stream,
//! per-entry extraction and decode errors resolve a single page as Failed.

use std::io;

/// Errors from opening a container or extracting one of its entries.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed container: {0}")]
    Malformed(String),

    #[error("unsupported container: {0}")]
    Unsupported(String),

    #[error("container has no displayable pages")]
    NoPages,

    /// Extraction of one entry failed. Per-page, not fatal to the container.
    #[error("failed to extract entry '{path}': {reason}")]
    Entry { path: String, reason: String },
}

impl ContainerError {
    /// True for errors that poison the whole container rather than one entry.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ContainerError::Entry { .. })
    }
}

/// Errors from decoding an extracted byte stream into a raster image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("decode I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid image data: {0}")]
    Invalid(String),
}
