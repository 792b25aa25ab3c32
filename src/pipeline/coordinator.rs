//! Pipeline coordinator: owns the two worker stages and the shared hand-off
//! structures, de-duplicates in-flight requests, and exposes the public
//! request/cancel/start/stop surface.

use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::extract::{ExtractContext, run_extract_loop};
use super::decode::run_decode_loop;
use super::handoff::Handoff;
use super::queue::RequestQueue;
use crate::container::ContainerFactory;
use crate::decoder::{ImagePageDecoder, PageDecoder};
use crate::events::{Notifier, StreamListener};
use crate::types::{PageState, StreamOptions, StreamState};

/// On-demand page stream over a container of image entries.
///
/// `start` spawns the extraction and decode workers; the container opens on
/// the extraction worker's thread, never the caller's. The caller requests
/// pages by index and receives results through its registered listeners;
/// it never blocks on extraction or decode. Dropping the stream stops both
/// workers and joins them.
pub struct PageStream {
    queue: Arc<RequestQueue>,
    handoff: Arc<Handoff>,
    notifier: Arc<Notifier>,
    cancel: Arc<AtomicBool>,
    size: Arc<AtomicUsize>,
    error: Arc<Mutex<Option<String>>>,
    decoder: Arc<dyn PageDecoder>,
    pipe_capacity: usize,
    /// Consumed by the first `start`; `None` afterward.
    factory: Mutex<Option<ContainerFactory>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PageStream {
    /// Build a stream with the production image decoder.
    pub fn new(factory: ContainerFactory, opts: StreamOptions) -> Self {
        Self::with_decoder(factory, opts, Arc::new(ImagePageDecoder))
    }

    /// Build a stream with a caller-supplied decoder (tests gate or count
    /// decodes through this seam).
    pub fn with_decoder(
        factory: ContainerFactory,
        opts: StreamOptions,
        decoder: Arc<dyn PageDecoder>,
    ) -> Self {
        Self {
            queue: Arc::new(RequestQueue::new()),
            handoff: Arc::new(Handoff::new()),
            notifier: Arc::new(Notifier::default()),
            cancel: Arc::new(AtomicBool::new(false)),
            size: Arc::new(AtomicUsize::new(0)),
            error: Arc::new(Mutex::new(None)),
            decoder,
            // A zero capacity would deadlock the pipe; treat it as 1.
            pipe_capacity: opts.pipe_capacity.max(1),
            factory: Mutex::new(Some(factory)),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn both workers. The container open (and its possible failure)
    /// happens on the extraction worker. A second call is a logged no-op.
    pub fn start(&self) {
        let Some(factory) = self.factory.lock().unwrap().take() else {
            warn!("start() called twice; ignoring");
            return;
        };

        let extract_ctx = ExtractContext {
            factory,
            queue: Arc::clone(&self.queue),
            handoff: Arc::clone(&self.handoff),
            notifier: Arc::clone(&self.notifier),
            cancel: Arc::clone(&self.cancel),
            size: Arc::clone(&self.size),
            error: Arc::clone(&self.error),
            pipe_capacity: self.pipe_capacity,
        };
        let extract = thread::Builder::new()
            .name("pagestream-extract".to_string())
            .spawn(move || run_extract_loop(extract_ctx))
            .expect("failed to spawn extraction worker");

        let handoff = Arc::clone(&self.handoff);
        let notifier = Arc::clone(&self.notifier);
        let decoder = Arc::clone(&self.decoder);
        let cancel = Arc::clone(&self.cancel);
        let decode = thread::Builder::new()
            .name("pagestream-decode".to_string())
            .spawn(move || run_decode_loop(handoff, notifier, decoder, cancel))
            .expect("failed to spawn decode worker");

        self.handles.lock().unwrap().extend([extract, decode]);
    }

    /// Signal both workers to stop and return immediately. Each worker
    /// observes the signal at its next blocking wait; an extraction or
    /// decode already underway runs to completion.
    pub fn stop(&self) {
        debug!("stop requested");
        self.cancel.store(true, Ordering::SeqCst);
        self.queue.close();
        self.handoff.close();
    }

    /// Request page `index`.
    ///
    /// A page already resolved Ready is re-delivered synchronously from the
    /// cache, with no re-extraction. Anything else is enqueued unless it is
    /// already queued, extracting, streamed, or decoding; either way the
    /// caller is notified the page is pending.
    pub fn request(&self, index: usize) {
        if let Some(image) = self.notifier.ready_image(index) {
            self.notifier.page_ready(index, image);
            return;
        }
        self.enqueue(index);
    }

    /// Request page `index`, bypassing the Ready cache: the cached result is
    /// cleared first, so the page is extracted and decoded again. In-flight
    /// work for the index is still de-duplicated.
    pub fn force_request(&self, index: usize) {
        self.notifier.clear_page(index);
        self.enqueue(index);
    }

    /// Cancel a still-queued request. An index that already began extracting
    /// or decoding runs to completion. Returns whether the request was
    /// removed; a removed request never produces a callback.
    pub fn cancel_request(&self, index: usize) -> bool {
        self.queue.remove(index)
    }

    /// Page count; 0 until the container finishes opening.
    pub fn page_count(&self) -> usize {
        self.size.load(Ordering::SeqCst)
    }

    /// Last fatal open-time error, if any.
    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap().clone()
    }

    /// Overall stream state.
    pub fn state(&self) -> StreamState {
        self.notifier.state()
    }

    /// Last reported state of page `index` (`Wait` when never requested).
    pub fn page_state(&self, index: usize) -> PageState {
        self.notifier.page_state(index)
    }

    pub fn add_listener(&self, listener: Arc<dyn StreamListener>) {
        self.notifier.add_listener(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn StreamListener>) {
        self.notifier.remove_listener(listener);
    }

    fn enqueue(&self, index: usize) {
        if self.queue.contains(index) || self.handoff.contains(index) {
            debug!("request for page {index} de-duplicated");
        } else if !self.queue.push(index) {
            debug!("request for page {index} rejected (stream stopped)");
            return;
        }
        self.notifier.page_wait(index);
    }
}

impl Drop for PageStream {
    fn drop(&mut self) {
        self.stop();
        for handle in self.handles.lock().unwrap().drain(..) {
            let _ = handle.join();
        }
    }
}
