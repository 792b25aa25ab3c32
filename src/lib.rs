//! Pagestream: on-demand page pipeline for image archives.
//!
//! Opens a container (CBZ-style zip of page images), orders its entries the
//! way a human orders numbered filenames, and resolves pages on request
//! through a two-stage background pipeline: an extraction worker streams an
//! entry's bytes through a bounded pipe to a decode worker, which reports
//! Ready/Failed per page through listener callbacks. The newest request is
//! served first; requests are de-duplicated and cancellable while queued.
//!
//! ```ignore
//! let factory = Box::new(move || {
//!     ZipContainer::open_path(&path).map(|c| Box::new(c) as Box<dyn Container>)
//! });
//! let stream = PageStream::new(factory, StreamOptions::default());
//! stream.add_listener(listener);
//! stream.start();
//! stream.request(0);
//! ```

pub mod cli;
pub mod container;
pub mod decoder;
pub mod error;
pub mod events;
pub mod natsort;
pub mod pipeline;
pub mod types;
pub mod utils;

pub use container::{Container, ContainerEntry, ContainerFactory, ZipContainer};
pub use decoder::{ImagePageDecoder, PageDecoder};
pub use error::{ContainerError, DecodeError};
pub use events::{PageEvent, StreamListener, channel_listener};
pub use natsort::natural_cmp;
pub use pipeline::{DEFAULT_PIPE_CAPACITY, PageStream};
pub use types::{PageState, StreamOptions, StreamState};
