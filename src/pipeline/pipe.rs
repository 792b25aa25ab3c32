//! Bounded in-memory byte pipe between the extraction and decode stages.
//!
//! Fixed capacity: write blocks when full, read blocks when empty, read
//! returns EOF once the writer is closed and the buffer is drained. Dropping
//! the reader fails further writes with `BrokenPipe`, which unblocks an
//! extractor stuck on a full pipe during shutdown.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};

struct PipeState {
    buf: VecDeque<u8>,
    capacity: usize,
    writer_closed: bool,
    reader_closed: bool,
}

struct Shared {
    state: Mutex<PipeState>,
    /// Signalled when space frees up or the reader closes.
    space: Condvar,
    /// Signalled when data arrives or the writer closes.
    data: Condvar,
}

/// Write end, owned by the extraction stage. Closing (or dropping) it lets
/// the reader drain and then observe EOF.
pub struct PipeWriter {
    shared: Arc<Shared>,
}

/// Read end, published into the hand-off map and consumed by the decode stage.
pub struct PipeReader {
    shared: Arc<Shared>,
}

/// Create a connected pipe with the given byte capacity.
pub fn byte_pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    assert!(capacity > 0, "pipe capacity must be non-zero");
    let shared = Arc::new(Shared {
        state: Mutex::new(PipeState {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            writer_closed: false,
            reader_closed: false,
        }),
        space: Condvar::new(),
        data: Condvar::new(),
    });
    (
        PipeWriter {
            shared: Arc::clone(&shared),
        },
        PipeReader { shared },
    )
}

impl Write for PipeWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock().unwrap();
        while state.buf.len() == state.capacity && !state.reader_closed {
            state = self.shared.space.wait(state).unwrap();
        }
        if state.reader_closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "pipe reader dropped",
            ));
        }
        let n = bytes.len().min(state.capacity - state.buf.len());
        state.buf.extend(bytes[..n].iter().copied());
        drop(state);
        self.shared.data.notify_one();
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.shared.state.lock().unwrap().writer_closed = true;
        self.shared.data.notify_all();
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock().unwrap();
        while state.buf.is_empty() && !state.writer_closed {
            state = self.shared.data.wait(state).unwrap();
        }
        if state.buf.is_empty() {
            return Ok(0); // writer closed and drained
        }
        let n = out.len().min(state.buf.len());
        for slot in out.iter_mut().take(n) {
            *slot = state.buf.pop_front().unwrap();
        }
        drop(state);
        self.shared.space.notify_one();
        Ok(n)
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.shared.state.lock().unwrap().reader_closed = true;
        self.shared.space.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn roundtrip_through_threads() {
        let (mut w, mut r) = byte_pipe(8);
        let payload: Vec<u8> = (0..200u8).collect();
        let expected = payload.clone();

        let writer = thread::spawn(move || {
            w.write_all(&payload).unwrap();
        });

        let mut got = Vec::new();
        r.read_to_end(&mut got).unwrap();
        writer.join().unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn eof_after_writer_drop() {
        let (mut w, mut r) = byte_pipe(16);
        w.write_all(b"abc").unwrap();
        drop(w);

        let mut got = Vec::new();
        r.read_to_end(&mut got).unwrap();
        assert_eq!(got, b"abc");
        // Subsequent reads keep returning EOF.
        assert_eq!(r.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn write_after_reader_drop_is_broken_pipe() {
        let (mut w, r) = byte_pipe(4);
        drop(r);
        let err = w.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn reader_drop_unblocks_full_writer() {
        let (mut w, r) = byte_pipe(4);
        let writer = thread::spawn(move || {
            // 4 bytes fill the pipe; the rest blocks until the reader drops.
            w.write_all(&[0u8; 64])
        });
        thread::sleep(Duration::from_millis(50));
        drop(r);
        assert!(writer.join().unwrap().is_err());
    }

    #[test]
    fn backpressure_bounds_buffered_bytes() {
        // Entry of size 16 * capacity against a deliberately slow reader:
        // the writer must block at least once and the buffer never exceeds
        // the configured capacity.
        const CAP: usize = 32;
        let (mut w, mut r) = byte_pipe(CAP);
        let total = CAP * 16;
        let max_seen = Arc::new(AtomicUsize::new(0));

        let shared = Arc::clone(&w.shared);
        let max_in_writer = Arc::clone(&max_seen);
        let writer = thread::spawn(move || {
            let mut sent = 0;
            let chunk = [7u8; 11];
            while sent < total {
                let n = (total - sent).min(chunk.len());
                w.write_all(&chunk[..n]).unwrap();
                sent += n;
                let buffered = shared.state.lock().unwrap().buf.len();
                max_in_writer.fetch_max(buffered, Ordering::Relaxed);
            }
        });

        let mut received = 0;
        let mut buf = [0u8; 13];
        while received < total {
            thread::sleep(Duration::from_millis(1));
            let n = r.read(&mut buf).unwrap();
            assert!(n > 0);
            received += n;
        }
        writer.join().unwrap();
        assert!(max_seen.load(Ordering::Relaxed) <= CAP);
    }
}
