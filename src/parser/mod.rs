//! Terminal escape sequence parser
//!
//! A stateful, resumable parser that turns the shell's output characters
//! into actions for the line buffer, recognizing control sequences through
//! the terminfo capability database.

mod actions;
mod matcher;
mod state;

pub use actions::{Command, TerminalAction};
pub use matcher::{MatchResult, ParamKind, SequenceMatcher};
pub use state::{Parser, MAX_CMD_LEN};
