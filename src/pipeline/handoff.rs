//! Pending-streams hand-off between the extraction and decode stages.
//!
//! The extraction stage publishes `(index, reader)` pairs as it starts
//! extracting; the decode stage takes them in arrival order (FIFO),
//! decoupling decode order from the request queue's LIFO pops.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use super::pipe::PipeReader;

struct HandoffState {
    streams: VecDeque<(usize, PipeReader)>,
    /// Index currently being decoded, if any.
    decoding: Option<usize>,
    closed: bool,
}

pub struct Handoff {
    state: Mutex<HandoffState>,
    cond: Condvar,
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Handoff {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HandoffState {
                streams: VecDeque::new(),
                decoding: None,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Publish a pending stream for `index` and signal the decode stage.
    /// Rejected (reader dropped) when the hand-off is closed or `index`
    /// already has a pending or in-flight stream.
    pub fn publish(&self, index: usize, reader: PipeReader) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.closed
            || state.decoding == Some(index)
            || state.streams.iter().any(|(i, _)| *i == index)
        {
            return false;
        }
        state.streams.push_back((index, reader));
        drop(state);
        self.cond.notify_one();
        true
    }

    /// Take the oldest pending stream, blocking while the map is empty.
    /// Atomically marks its index as the in-flight decode target. Returns
    /// `None` once the hand-off is closed.
    pub fn take_oldest(&self) -> Option<(usize, PipeReader)> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.closed {
                return None;
            }
            if let Some((index, reader)) = state.streams.pop_front() {
                state.decoding = Some(index);
                return Some((index, reader));
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Clear the in-flight decode marker.
    pub fn finish_decoding(&self) {
        self.state.lock().unwrap().decoding = None;
    }

    /// True when `index` has a pending stream or is the in-flight decode target.
    pub fn contains(&self, index: usize) -> bool {
        let state = self.state.lock().unwrap();
        state.decoding == Some(index) || state.streams.iter().any(|(i, _)| *i == index)
    }

    /// Close the hand-off: wakes a blocked `take_oldest` and drops all queued
    /// readers, which unblocks any extractor stuck writing into a full pipe.
    pub fn close(&self) {
        let drained: Vec<_> = {
            let mut state = self.state.lock().unwrap();
            state.closed = true;
            state.streams.drain(..).collect()
        };
        self.cond.notify_all();
        drop(drained);
    }
}
