//! Quiescence hand-off between the reader and the flusher
//!
//! The reader appends decoded text as it arrives. The flusher sleeps on a
//! condition variable until text is present, then keeps waiting until no
//! text has arrived for the quiet interval, and takes everything in one
//! swap. The lock is only ever held for appends and swaps.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Result of waiting for a flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flush {
    /// Text that has been quiet for the full interval
    Batch(String),
    /// The stream ended; carries whatever was still buffered
    Closed(Option<String>),
}

#[derive(Debug)]
struct Inner {
    text: String,
    last_feed: Instant,
    closed: bool,
}

/// Shared text accumulator with a last-activity timestamp
#[derive(Debug)]
pub struct Accumulator {
    inner: Mutex<Inner>,
    ready: Condvar,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                text: String::new(),
                last_feed: Instant::now(),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    // Holders never leave the text half-written
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one character
    pub fn feed(&self, c: char) {
        let mut buf = [0u8; 4];
        self.feed_str(c.encode_utf8(&mut buf));
    }

    /// Append decoded text
    pub fn feed_str(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut inner = self.lock();
        if inner.closed {
            tracing::debug!("Dropping {} bytes fed after close", text.len());
            return;
        }
        let was_empty = inner.text.is_empty();
        inner.text.push_str(text);
        inner.last_feed = Instant::now();
        drop(inner);

        // A flusher already counting down re-reads the timestamp on its own
        if was_empty {
            self.ready.notify_one();
        }
    }

    /// Mark the end of the stream and wake the flusher
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Bytes buffered and not yet flushed
    pub fn pending_len(&self) -> usize {
        self.lock().text.len()
    }

    /// Block until a batch has been quiet for `quiet`, or the stream closed
    pub fn wait_flush(&self, quiet: Duration) -> Flush {
        let mut inner = self.lock();
        loop {
            if inner.closed {
                let rest = std::mem::take(&mut inner.text);
                return Flush::Closed((!rest.is_empty()).then_some(rest));
            }

            if inner.text.is_empty() {
                inner = self.ready.wait(inner).unwrap_or_else(PoisonError::into_inner);
                continue;
            }

            let idle = inner.last_feed.elapsed();
            if idle >= quiet {
                return Flush::Batch(std::mem::take(&mut inner.text));
            }

            let (guard, _) = self
                .ready
                .wait_timeout(inner, quiet - idle)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
        }
    }
}
