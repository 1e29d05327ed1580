//! Cursor (hot point) position
//!
//! The cursor marks where the next character lands and which character
//! backspace removes. Columns count characters, not display cells.

use serde::{Deserialize, Serialize};

/// Cursor position, both coordinates 0-indexed
///
/// `col` may equal the length of the line at `row`: the end-of-line
/// position where appended text goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cursor at the given position
    pub fn at(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Advance the column by `n` characters
    pub fn advance(&mut self, n: usize) {
        self.col += n;
    }

    /// Move to the start of the given row
    pub fn start_of(&mut self, row: usize) {
        self.col = 0;
        self.row = row;
    }

    /// Move left by one column, stopping at column 0
    pub fn retreat(&mut self) -> bool {
        if self.col == 0 {
            return false;
        }
        self.col -= 1;
        true
    }
}
