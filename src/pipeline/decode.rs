//! Decode stage: consumes pending streams in arrival order and resolves
//! each page as Ready or Failed.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::handoff::Handoff;
use crate::decoder::PageDecoder;
use crate::events::Notifier;

/// Decode worker body. Per-page decode errors resolve that page as Failed
/// and never exit the loop.
pub(crate) fn run_decode_loop(
    handoff: Arc<Handoff>,
    notifier: Arc<Notifier>,
    decoder: Arc<dyn PageDecoder>,
    cancel: Arc<AtomicBool>,
) {
    while !cancel.load(Ordering::SeqCst) {
        let Some((index, mut reader)) = handoff.take_oldest() else {
            break; // hand-off closed
        };

        match decoder.decode(&mut reader) {
            Ok(image) => {
                debug!("decoded page {index} ({}x{})", image.width(), image.height());
                notifier.page_ready(index, Arc::new(image));
            }
            Err(e) => notifier.page_failed(index, &format!("decode failed: {e}")),
        }
        // Cleared on both paths so the index is never left marked busy.
        handoff.finish_decoding();
    }
    debug!("decode worker exiting");
}
