//! Output Pipeline
//!
//! Decouples raw reads of the shell's output from batched delivery to the
//! terminal. Two named threads per session:
//!
//! - reader: blocking reads, UTF-8 decoding, appends to the [`Accumulator`]
//! - flusher: waits for quiescence and hands each batch to a [`Dispatch`]
//!
//! Batches are delivered in arrival order by the single flusher thread, so
//! the dispatch target never runs concurrently with itself. When the source
//! reaches end of stream the residue is flushed unconditionally before both
//! threads exit.

mod accumulator;
mod decoder;

pub use accumulator::{Accumulator, Flush};
pub use decoder::Utf8Decoder;

use std::io::{self, Read};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

/// Receives flushed batches on the flusher thread
pub trait Dispatch: Send + 'static {
    /// Deliver one batch
    fn dispatch(&mut self, batch: String);

    /// The stream ended; called once after the final batch
    fn closed(&mut self) {}
}

impl Dispatch for mpsc::Sender<String> {
    fn dispatch(&mut self, batch: String) {
        if self.send(batch).is_err() {
            tracing::debug!("Batch receiver dropped");
        }
    }
}

/// Pipeline timing and sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// How long the stream must be silent before a flush
    pub quiescence: Duration,
    /// Bytes requested per raw read
    pub read_buffer_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            quiescence: Duration::from_millis(10),
            read_buffer_size: 4096,
        }
    }
}

/// Running reader and flusher threads for one output stream
#[derive(Debug)]
pub struct OutputPipeline<D> {
    accumulator: Arc<Accumulator>,
    reader: JoinHandle<()>,
    flusher: JoinHandle<D>,
}

impl<D: Dispatch> OutputPipeline<D> {
    /// Start reading `source` and delivering batches to `dispatch`
    pub fn spawn<R>(
        source: R,
        dispatch: D,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError>
    where
        R: Read + Send + 'static,
    {
        let accumulator = Arc::new(Accumulator::new());

        let flusher = {
            let accumulator = Arc::clone(&accumulator);
            thread::Builder::new()
                .name("linux-term-flusher".to_string())
                .spawn(move || flush_loop(&accumulator, dispatch, options.quiescence))
                .map_err(|source| PipelineError::Spawn {
                    name: "flusher",
                    source,
                })?
        };

        let reader = {
            let accumulator = Arc::clone(&accumulator);
            thread::Builder::new()
                .name("linux-term-reader".to_string())
                .spawn(move || read_loop(source, &accumulator, options.read_buffer_size))
        };

        let reader = match reader {
            Ok(handle) => handle,
            Err(source) => {
                accumulator.close();
                if flusher.join().is_err() {
                    tracing::warn!("Flusher panicked while shutting down");
                }
                return Err(PipelineError::Spawn {
                    name: "reader",
                    source,
                });
            }
        };

        tracing::debug!(
            "Output pipeline started ({:?} quiescence, {} byte reads)",
            options.quiescence,
            options.read_buffer_size
        );

        Ok(Self {
            accumulator,
            reader,
            flusher,
        })
    }

    /// The shared accumulator, for feeding text directly
    pub fn accumulator(&self) -> &Arc<Accumulator> {
        &self.accumulator
    }

    /// Wait for end of stream and the final flush, returning the dispatch
    /// target
    pub fn join(self) -> Result<D, PipelineError> {
        let reader = self.reader.join();
        // The reader closes the accumulator even when it panics
        let dispatch = self
            .flusher
            .join()
            .map_err(|_| PipelineError::WorkerPanicked("flusher"))?;
        reader.map_err(|_| PipelineError::WorkerPanicked("reader"))?;
        Ok(dispatch)
    }
}

/// Closes the accumulator when the reader exits, however it exits
struct CloseOnDrop<'a>(&'a Accumulator);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn read_loop<R: Read>(mut source: R, accumulator: &Accumulator, buffer_size: usize) {
    let _close = CloseOnDrop(accumulator);
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut decoder = Utf8Decoder::new();
    let mut text = String::new();

    loop {
        match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                text.clear();
                decoder.decode(&buf[..n], &mut text);
                accumulator.feed_str(&text);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // EIO is how a pty master reports that the child hung up
                tracing::debug!("Output stream ended: {}", e);
                break;
            }
        }
    }

    text.clear();
    decoder.finish(&mut text);
    accumulator.feed_str(&text);
}

fn flush_loop<D: Dispatch>(accumulator: &Accumulator, mut dispatch: D, quiet: Duration) -> D {
    loop {
        match accumulator.wait_flush(quiet) {
            Flush::Batch(batch) => dispatch.dispatch(batch),
            Flush::Closed(rest) => {
                if let Some(batch) = rest {
                    dispatch.dispatch(batch);
                }
                dispatch.closed();
                return dispatch;
            }
        }
    }
}
