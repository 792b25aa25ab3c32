//! Public types for the pagestream API.

use image::DynamicImage;
use std::sync::Arc;

use crate::pipeline::DEFAULT_PIPE_CAPACITY;

/// Options for [`PageStream`](crate::PageStream).
#[derive(Clone, Debug)]
pub struct StreamOptions {
    /// Byte capacity of the pipe between the extraction and decode stages.
    /// Bounds memory per in-flight page and throttles a fast extractor
    /// behind a slow decoder. Values below 1 are treated as 1.
    pub pipe_capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
        }
    }
}

/// State of one page, as last reported to listeners.
#[derive(Clone, Debug, Default)]
pub enum PageState {
    /// Not resolved yet: queued, extracting, streamed, decoding, or never requested.
    #[default]
    Wait,
    /// Decoded successfully. Holds the raster so a repeat request can be
    /// answered without re-extraction.
    Ready(Arc<DynamicImage>),
    /// Last attempt failed with this reason. Re-requesting retries.
    Failed(String),
}

/// Overall stream state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamState {
    /// Container not opened yet.
    #[default]
    Wait,
    /// Container open, page count known, pages resolvable.
    Ready,
    /// Container failed to open; terminal.
    Error,
}
