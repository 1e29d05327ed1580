//! Linux Term Library
//!
//! Reconstructs what a screen reader needs from the raw output of an
//! interactive shell running under the `linux` terminal type: a scrollback
//! of text lines, a cursor, and what to announce. This crate provides:
//!
//! - `terminfo`: capability database parsed from `infocmp` output
//! - `parser`: resumable escape sequence matcher and state machine
//! - `core`: line buffer, cursor, snapshots
//! - `terminal`: applies parsed actions and reports batch updates
//! - `speech`: what to say for each batch
//! - `pipeline`: reader/flusher threads with quiescence batching
//! - `session`: wires all of the above to one output stream
//! - `input`: keystroke encoding for the shell's pty
//! - `app`: configuration and logging

pub mod app;
pub mod core;
pub mod input;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod speech;
pub mod terminal;
pub mod terminfo;

pub use app::Config;
pub use session::{Session, SessionError, SessionEvent, SessionListener};
pub use terminal::{BatchUpdate, CarriageReturnPolicy, Terminal};
pub use terminfo::CapabilityDatabase;
