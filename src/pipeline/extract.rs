//! Extraction stage: opens the container on its own thread, fixes the page
//! order, then loops popping requested indices and streaming each entry
//! into a fresh pipe whose read end is handed to the decode stage.

use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::handoff::Handoff;
use super::pipe::byte_pipe;
use super::queue::RequestQueue;
use crate::container::ContainerFactory;
use crate::error::ContainerError;
use crate::events::Notifier;
use crate::natsort::natural_cmp;
use crate::types::PageState;

/// Everything the extraction worker needs, built by the coordinator and
/// moved into the thread.
pub(crate) struct ExtractContext {
    pub factory: ContainerFactory,
    pub queue: Arc<RequestQueue>,
    pub handoff: Arc<Handoff>,
    pub notifier: Arc<Notifier>,
    pub cancel: Arc<AtomicBool>,
    pub size: Arc<AtomicUsize>,
    pub error: Arc<Mutex<Option<String>>>,
    pub pipe_capacity: usize,
}

/// Extraction worker body. The container handle lives and dies on this
/// thread; it is dropped (closed) exactly once when the loop exits.
pub(crate) fn run_extract_loop(ctx: ExtractContext) {
    let ExtractContext {
        factory,
        queue,
        handoff,
        notifier,
        cancel,
        size,
        error,
        pipe_capacity,
    } = ctx;

    // Open failure: record the error, notify once, and close both shared
    // structures so the decode worker winds down too.
    let fail_open = |message: String| {
        warn!("container open failed: {message}");
        *error.lock().unwrap() = Some(message.clone());
        notifier.open_error(&message);
        queue.close();
        handoff.close();
    };

    let mut container = match factory() {
        Ok(c) if c.entries().is_empty() => {
            fail_open(ContainerError::NoPages.to_string());
            return;
        }
        Ok(c) => c,
        Err(e) => {
            fail_open(e.to_string());
            return;
        }
    };

    // Natural sort once: page index -> (native index, path).
    let mut pages: Vec<(usize, String)> = container
        .entries()
        .iter()
        .map(|e| (e.index, e.path.clone()))
        .collect();
    pages.sort_by(|a, b| natural_cmp(&a.1, &b.1));

    size.store(pages.len(), Ordering::SeqCst);
    debug!("container open, {} pages", pages.len());
    notifier.size_ready(pages.len());

    while !cancel.load(Ordering::SeqCst) {
        let Some(index) = queue.pop_most_recent() else {
            break; // queue closed
        };

        let Some((native, path)) = pages.get(index).cloned() else {
            notifier.page_failed(index, &format!("page index {index} out of range"));
            queue.finish_extracting();
            continue;
        };

        // Skip work that is already done or already on its way to the decoder.
        if matches!(notifier.page_state(index), PageState::Ready(_)) || handoff.contains(index) {
            queue.finish_extracting();
            continue;
        }

        let (mut writer, reader) = byte_pipe(pipe_capacity);
        if !handoff.publish(index, reader) {
            queue.finish_extracting();
            continue;
        }

        match container.extract(native, &mut writer) {
            Ok(n) => debug!("extracted page {index} ('{path}'), {n} bytes"),
            // Writer is dropped below with partial or no data; the decode
            // stage observes the truncation and resolves the page as failed.
            Err(e) => warn!("extraction of page {index} ('{path}') failed: {e}"),
        }
        drop(writer);
        queue.finish_extracting();
    }
    debug!("extraction worker exiting");
}
