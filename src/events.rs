//! Listener layer: the callback boundary toward the caller, plus the
//! per-page state table the coordinator consults for the Ready fast path.

use crossbeam_channel::{Receiver, Sender, unbounded};
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::types::{PageState, StreamState};

/// Callbacks delivered by the pipeline. Called from the worker threads, never
/// under a pipeline lock; implementations may re-enter the coordinator.
pub trait StreamListener: Send + Sync {
    /// Container opened; `count` pages are addressable.
    fn on_size_ready(&self, count: usize);
    /// Container failed to open. Terminal; no page callbacks will follow.
    fn on_open_error(&self, message: &str);
    /// A page decoded successfully.
    fn on_page_ready(&self, index: usize, image: Arc<DynamicImage>);
    /// A page's extraction or decode failed. Re-requesting retries.
    fn on_page_failed(&self, index: usize, reason: &str);
    /// A page request was accepted and is pending.
    fn on_page_wait(&self, index: usize);
}

/// Owned mirror of the listener callbacks, for receiver-style consumers.
#[derive(Clone, Debug)]
pub enum PageEvent {
    SizeReady(usize),
    OpenError(String),
    PageReady(usize, Arc<DynamicImage>),
    PageFailed(usize, String),
    PageWait(usize),
}

struct ChannelListener {
    tx: Sender<PageEvent>,
}

impl StreamListener for ChannelListener {
    fn on_size_ready(&self, count: usize) {
        let _ = self.tx.send(PageEvent::SizeReady(count));
    }
    fn on_open_error(&self, message: &str) {
        let _ = self.tx.send(PageEvent::OpenError(message.to_string()));
    }
    fn on_page_ready(&self, index: usize, image: Arc<DynamicImage>) {
        let _ = self.tx.send(PageEvent::PageReady(index, image));
    }
    fn on_page_failed(&self, index: usize, reason: &str) {
        let _ = self.tx.send(PageEvent::PageFailed(index, reason.to_string()));
    }
    fn on_page_wait(&self, index: usize) {
        let _ = self.tx.send(PageEvent::PageWait(index));
    }
}

/// Listener that forwards every callback onto an unbounded channel. Used by
/// the CLI and tests to drain events instead of implementing the trait.
pub fn channel_listener() -> (Arc<dyn StreamListener>, Receiver<PageEvent>) {
    let (tx, rx) = unbounded();
    (Arc::new(ChannelListener { tx }), rx)
}

/// Listener set plus the per-index page-state table and overall stream state.
///
/// The decoded-page cache lives here, outside the pipeline hand-off
/// structures: `page_ready` records the raster so a repeat request can be
/// re-delivered synchronously, and `clear_page` invalidates it for a forced
/// re-extraction.
#[derive(Default)]
pub struct Notifier {
    listeners: Mutex<Vec<Arc<dyn StreamListener>>>,
    pages: Mutex<HashMap<usize, PageState>>,
    state: Mutex<StreamState>,
}

impl Notifier {
    pub fn add_listener(&self, listener: Arc<dyn StreamListener>) {
        self.listeners.lock().unwrap().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn StreamListener>) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    pub fn state(&self) -> StreamState {
        *self.state.lock().unwrap()
    }

    pub fn page_state(&self, index: usize) -> PageState {
        self.pages
            .lock()
            .unwrap()
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    /// The cached raster for `index`, when its last resolution was Ready.
    pub fn ready_image(&self, index: usize) -> Option<Arc<DynamicImage>> {
        match self.pages.lock().unwrap().get(&index) {
            Some(PageState::Ready(image)) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Forget the last resolution for `index` (forced re-extraction path).
    pub fn clear_page(&self, index: usize) {
        self.pages.lock().unwrap().remove(&index);
    }

    pub fn size_ready(&self, count: usize) {
        *self.state.lock().unwrap() = StreamState::Ready;
        for l in self.snapshot() {
            l.on_size_ready(count);
        }
    }

    pub fn open_error(&self, message: &str) {
        *self.state.lock().unwrap() = StreamState::Error;
        for l in self.snapshot() {
            l.on_open_error(message);
        }
    }

    pub fn page_wait(&self, index: usize) {
        self.pages.lock().unwrap().insert(index, PageState::Wait);
        for l in self.snapshot() {
            l.on_page_wait(index);
        }
    }

    pub fn page_ready(&self, index: usize, image: Arc<DynamicImage>) {
        self.pages
            .lock()
            .unwrap()
            .insert(index, PageState::Ready(Arc::clone(&image)));
        for l in self.snapshot() {
            l.on_page_ready(index, Arc::clone(&image));
        }
    }

    pub fn page_failed(&self, index: usize, reason: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(index, PageState::Failed(reason.to_string()));
        for l in self.snapshot() {
            l.on_page_failed(index, reason);
        }
    }

    // Snapshot so callbacks never run under the listener lock.
    fn snapshot(&self) -> Vec<Arc<dyn StreamListener>> {
        self.listeners.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_state_tracks_last_callback() {
        let n = Notifier::default();
        assert!(matches!(n.page_state(0), PageState::Wait));

        n.page_failed(0, "decode failed");
        assert!(matches!(n.page_state(0), PageState::Failed(_)));

        let img = Arc::new(DynamicImage::new_rgb8(1, 1));
        n.page_ready(0, img);
        assert!(n.ready_image(0).is_some());

        n.clear_page(0);
        assert!(matches!(n.page_state(0), PageState::Wait));
        assert!(n.ready_image(0).is_none());
    }

    #[test]
    fn channel_listener_forwards_events() {
        let n = Notifier::default();
        let (listener, rx) = channel_listener();
        n.add_listener(listener);

        n.size_ready(3);
        n.page_wait(1);
        assert!(matches!(rx.try_recv(), Ok(PageEvent::SizeReady(3))));
        assert!(matches!(rx.try_recv(), Ok(PageEvent::PageWait(1))));
        assert_eq!(n.state(), StreamState::Ready);
    }

    #[test]
    fn removed_listener_gets_nothing() {
        let n = Notifier::default();
        let (listener, rx) = channel_listener();
        n.add_listener(Arc::clone(&listener));
        n.remove_listener(&listener);

        n.page_wait(0);
        assert!(rx.try_recv().is_err());
    }
}
