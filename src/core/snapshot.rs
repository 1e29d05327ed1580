//! Deterministic snapshot generation
//!
//! Snapshots capture the line buffer in a serializable format for testing
//! and debugging. Given the same character stream, the terminal must produce
//! identical snapshots no matter how the stream was split into batches.

use serde::{Deserialize, Serialize};

use super::line_buffer::LineBuffer;

/// Lines plus cursor position
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Buffer content in row order
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
}

impl Snapshot {
    /// Create a snapshot from a line buffer
    pub fn from_buffer(buffer: &LineBuffer) -> Self {
        Self {
            lines: buffer.lines().to_vec(),
            cursor_row: buffer.cursor_row(),
            cursor_col: buffer.cursor_col(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Render as plain text, one line per row, with control characters
    /// shown in caret notation
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            for c in line.chars() {
                push_visible(&mut text, c);
            }
            text.push('\n');
        }
        text
    }
}

fn push_visible(text: &mut String, c: char) {
    match c {
        '\x00'..='\x1f' => {
            text.push('^');
            text.push(char::from(c as u8 + 0x40));
        }
        '\x7f' => text.push_str("^?"),
        c => text.push(c),
    }
}
