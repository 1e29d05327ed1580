//! Announcement composition
//!
//! Decides what a screen reader should say for one batch of output. Only
//! the literal text that reached the line buffer is considered; commands
//! never contribute. How the announcement is spoken is up to the listener.

use serde::{Deserialize, Serialize};

/// What to say for a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    /// A single character, spelled out
    Letter(char),
    /// Running text
    Text(String),
}

impl Announcement {
    /// The announcement as plain text
    pub fn as_text(&self) -> String {
        match self {
            Announcement::Letter(c) => c.to_string(),
            Announcement::Text(text) => text.clone(),
        }
    }
}

/// Collects the printed characters of a batch
#[derive(Debug, Clone, Default)]
pub struct SpeechComposer {
    text: String,
    /// Most recent character removed by backspace
    erased: Option<char>,
}

impl SpeechComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a character that was printed
    pub fn push(&mut self, c: char) {
        match c {
            '\x07' => {},
            c if c < ' ' => self.text.push(' '),
            c => self.text.push(c),
        }
    }

    /// Record a separator between printed runs (folded carriage returns)
    pub fn push_break(&mut self) {
        self.text.push(' ');
    }

    /// Record a character removed by backspace
    pub fn erased(&mut self, c: char) {
        self.erased = Some(c);
    }

    /// Produce the announcement and reset for the next batch
    pub fn finish(&mut self) -> Option<Announcement> {
        let text = std::mem::take(&mut self.text);
        let erased = self.erased.take();

        let trimmed = text.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (None, _) => erased.map(Announcement::Letter),
            (Some(c), None) => Some(Announcement::Letter(c)),
            _ => Some(Announcement::Text(trimmed.to_string())),
        }
    }
}
