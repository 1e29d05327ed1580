//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - The line buffer (scrollback of text lines)
//! - Cursor position
//! - Deterministic snapshot generation
//!
//! The core is designed to be completely deterministic: given the same
//! sequence of terminal actions, it will always produce the same state.

mod cursor;
mod line_buffer;
mod snapshot;

pub use cursor::Cursor;
pub use line_buffer::LineBuffer;
pub use snapshot::Snapshot;
