//! Terminfo capability database
//!
//! Turns the text printed by `infocmp` for a terminal type into a lookup
//! table from literal control sequences to capability names. Only string
//! capabilities without parameters are kept, since they are the only ones
//! that can be matched literally against terminal output.

mod database;
mod dump;

pub use database::CapabilityDatabase;
pub use dump::{tokenize, Field};

/// The escape character that starts every matched control sequence
pub const ESC: char = '\x1b';

/// Error type for capability database construction
#[derive(Debug, thiserror::Error)]
pub enum TermInfoError {
    #[error("Malformed capability data at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for capability database operations
pub type TermInfoResult<T> = Result<T, TermInfoError>;
