//! Terminal session
//!
//! Wires a capability database, a [`Terminal`] and an [`OutputPipeline`]
//! together. Each flushed batch is interpreted on the flusher thread and the
//! result is reported to a [`SessionListener`].

use std::io::Read;
use std::sync::{mpsc, Arc};

use thiserror::Error;

use crate::app::Config;
use crate::core::{LineBuffer, Snapshot};
use crate::pipeline::{Dispatch, OutputPipeline, PipelineError, PipelineOptions};
use crate::speech::Announcement;
use crate::terminal::{BatchUpdate, Terminal};
use crate::terminfo::{CapabilityDatabase, TermInfoError};

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Capability database: {0}")]
    TermInfo(#[from] TermInfoError),

    #[error("Output pipeline: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Observer of an interpreted output stream
///
/// Called on the flusher thread, one batch at a time.
pub trait SessionListener: Send + 'static {
    /// A batch has been applied to the buffer
    fn on_batch_ready(&mut self, buffer: &LineBuffer, update: &BatchUpdate);

    /// BEL was received
    fn on_bell(&mut self) {}

    /// Something should be spoken
    fn on_announcement(&mut self, _announcement: &Announcement) {}

    /// The output stream ended and the last batch has been applied
    fn on_closed(&mut self, _buffer: &LineBuffer) {}
}

/// Owned notification for listeners on other threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Batch {
        update: BatchUpdate,
        snapshot: Snapshot,
    },
    Bell,
    Announcement(Announcement),
    Closed(Snapshot),
}

impl SessionListener for mpsc::Sender<SessionEvent> {
    fn on_batch_ready(&mut self, buffer: &LineBuffer, update: &BatchUpdate) {
        send_event(
            self,
            SessionEvent::Batch {
                update: update.clone(),
                snapshot: Snapshot::from_buffer(buffer),
            },
        );
    }

    fn on_bell(&mut self) {
        send_event(self, SessionEvent::Bell);
    }

    fn on_announcement(&mut self, announcement: &Announcement) {
        send_event(self, SessionEvent::Announcement(announcement.clone()));
    }

    fn on_closed(&mut self, buffer: &LineBuffer) {
        send_event(self, SessionEvent::Closed(Snapshot::from_buffer(buffer)));
    }
}

fn send_event(sender: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if sender.send(event).is_err() {
        tracing::debug!("Session event receiver dropped");
    }
}

/// The flusher's dispatch target: interprets batches and notifies
struct TerminalDispatch<L> {
    terminal: Terminal,
    listener: L,
}

impl<L: SessionListener> Dispatch for TerminalDispatch<L> {
    fn dispatch(&mut self, batch: String) {
        let update = self.terminal.term_text(&batch);

        self.listener.on_batch_ready(self.terminal.buffer(), &update);
        for _ in 0..update.bells {
            self.listener.on_bell();
        }
        if let Some(announcement) = &update.announcement {
            self.listener.on_announcement(announcement);
        }
    }

    fn closed(&mut self) {
        self.listener.on_closed(self.terminal.buffer());
    }
}

/// A running terminal session over one output stream
pub struct Session<L> {
    pipeline: OutputPipeline<TerminalDispatch<L>>,
}

impl<L: SessionListener> Session<L> {
    /// Parse `dump`, then start interpreting `source`
    ///
    /// Fails if the capability dump is malformed or a thread can't be
    /// spawned.
    pub fn start<R>(
        config: &Config,
        dump: &str,
        source: R,
        listener: L,
    ) -> Result<Self, SessionError>
    where
        R: Read + Send + 'static,
    {
        let database = CapabilityDatabase::build(dump)?;
        Self::with_database(config, Arc::new(database), source, listener)
    }

    /// Start interpreting `source` against an already built database
    pub fn with_database<R>(
        config: &Config,
        database: Arc<CapabilityDatabase>,
        source: R,
        listener: L,
    ) -> Result<Self, SessionError>
    where
        R: Read + Send + 'static,
    {
        tracing::info!(
            "Starting {} session ({} capabilities)",
            config.terminal_name,
            database.len()
        );

        let terminal = Terminal::new(database).with_carriage_return(config.carriage_return);
        let options = PipelineOptions {
            quiescence: config.quiescence(),
            read_buffer_size: config.read_buffer_size,
        };
        let dispatch = TerminalDispatch { terminal, listener };
        let pipeline = OutputPipeline::spawn(source, dispatch, options)?;

        Ok(Self { pipeline })
    }

    /// Wait for the stream to end, returning the final terminal and the
    /// listener
    pub fn wait(self) -> Result<(Terminal, L), SessionError> {
        let TerminalDispatch { terminal, listener } = self.pipeline.join()?;
        tracing::info!("Session ended with {} lines", terminal.buffer().line_count());
        Ok((terminal, listener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Records callbacks
    #[derive(Default)]
    struct Recorder {
        batches: usize,
        bells: usize,
        spoken: Vec<Announcement>,
        closed_lines: Option<Vec<String>>,
    }

    impl SessionListener for Recorder {
        fn on_batch_ready(&mut self, _buffer: &LineBuffer, _update: &BatchUpdate) {
            self.batches += 1;
        }

        fn on_bell(&mut self) {
            self.bells += 1;
        }

        fn on_announcement(&mut self, announcement: &Announcement) {
            self.spoken.push(announcement.clone());
        }

        fn on_closed(&mut self, buffer: &LineBuffer) {
            self.closed_lines = Some(buffer.lines().to_vec());
        }
    }

    #[test]
    fn test_session_runs_to_end() {
        let source = Cursor::new(b"\x07$ ls\r\nfile\r\n".to_vec());
        let dump = "linux, el=\\E[K,";
        let session =
            Session::start(&Config::default(), dump, source, Recorder::default()).unwrap();
        let (terminal, recorder) = session.wait().unwrap();

        assert_eq!(terminal.buffer().lines(), ["$ ls", "file", ""]);
        assert!(recorder.batches >= 1);
        assert_eq!(recorder.bells, 1);
        assert!(!recorder.spoken.is_empty());
        assert_eq!(
            recorder.closed_lines.as_deref(),
            Some(terminal.buffer().lines())
        );
    }

    #[test]
    fn test_session_malformed_dump() {
        let result = Session::start(
            &Config::default(),
            "linux, el=\\",
            Cursor::new(Vec::new()),
            Recorder::default(),
        );

        assert!(matches!(result, Err(SessionError::TermInfo(_))));
    }
}
