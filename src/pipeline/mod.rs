//! The two-stage page pipeline: request queue → extraction worker →
//! bounded byte pipe → pending-streams hand-off → decode worker.

pub mod coordinator;
pub mod handoff;
pub mod pipe;
pub mod queue;

mod decode;
mod extract;

pub use coordinator::PageStream;
pub use handoff::Handoff;
pub use pipe::{PipeReader, PipeWriter, byte_pipe};
pub use queue::RequestQueue;

/// Default byte capacity of the extraction→decode pipe. Small on purpose:
/// it bounds per-page memory and lets a slow decoder throttle the extractor.
pub const DEFAULT_PIPE_CAPACITY: usize = 4096;
