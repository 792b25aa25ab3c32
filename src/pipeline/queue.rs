//! Request queue: most-recently-requested-first stack of pending page
//! indices, shared between the caller side and the extraction stage.
//!
//! LIFO ordering models "the newest request matters most" while the user
//! navigates. A request that keeps getting buried can starve under
//! continuous navigation; that is the documented trade-off of this queue,
//! not a bug.

use std::sync::{Condvar, Mutex};

struct QueueState {
    stack: Vec<usize>,
    /// Index currently being extracted, if any.
    extracting: Option<usize>,
    closed: bool,
}

pub struct RequestQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                stack: Vec::new(),
                extracting: None,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Enqueue `index` unless it is already queued, already the in-flight
    /// extraction target, or the queue is closed. Returns whether it was added.
    pub fn push(&self, index: usize) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.closed || state.extracting == Some(index) || state.stack.contains(&index) {
            return false;
        }
        state.stack.push(index);
        drop(state);
        self.cond.notify_one();
        true
    }

    /// Pop the most recently pushed index, blocking while the queue is empty.
    /// Atomically marks the popped index as the in-flight extraction target.
    /// Returns `None` once the queue is closed.
    pub fn pop_most_recent(&self) -> Option<usize> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.closed {
                return None;
            }
            if let Some(index) = state.stack.pop() {
                state.extracting = Some(index);
                return Some(index);
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Clear the in-flight extraction marker.
    pub fn finish_extracting(&self) {
        self.state.lock().unwrap().extracting = None;
    }

    /// Cancel a still-queued request. Returns false when `index` was not
    /// queued (including when it already began extracting).
    pub fn remove(&self, index: usize) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.stack.iter().position(|&i| i == index) {
            Some(pos) => {
                state.stack.remove(pos);
                true
            }
            None => false,
        }
    }

    /// True when `index` is queued or is the in-flight extraction target.
    pub fn contains(&self, index: usize) -> bool {
        let state = self.state.lock().unwrap();
        state.extracting == Some(index) || state.stack.contains(&index)
    }

    /// Close the queue: a blocked `pop_most_recent` wakes and returns `None`,
    /// and further pushes are rejected.
    pub fn close(&self) {
        self.state.lock().unwrap().closed = true;
        self.cond.notify_all();
    }
}
