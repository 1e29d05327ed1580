//! Line buffer
//!
//! The scrollback as the screen reader sees it: an ordered list of text
//! lines that only grows, with the cursor always on the last line unless
//! something outside the normal action flow moved it.

use super::cursor::Cursor;

/// Ordered text lines plus the cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    cursor: Cursor,
    /// Lowest row touched since the last [`LineBuffer::take_dirty`]
    dirty_from: Option<usize>,
}

impl LineBuffer {
    /// Create an empty buffer (no lines yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the first line if the buffer is still empty
    pub fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
            self.cursor = Cursor::new();
            self.mark_dirty(0);
        }
    }

    /// Append text to the last line and move the cursor past it
    pub fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let row = self.last_row();
        self.lines[row].push_str(text);
        self.cursor.advance(text.chars().count());
        self.mark_dirty(row);
    }

    /// Append a single character to the last line
    pub fn append_char(&mut self, c: char) {
        let row = self.last_row();
        self.lines[row].push(c);
        self.cursor.advance(1);
        self.mark_dirty(row);
    }

    /// Start a new, empty line and put the cursor at its start
    pub fn newline(&mut self) {
        self.ensure_line();
        self.lines.push(String::new());
        let row = self.lines.len() - 1;
        self.cursor.start_of(row);
        self.mark_dirty(row);
    }

    /// Remove the character left of the cursor
    ///
    /// Returns the removed character. At column 0, or past the end of the
    /// line, nothing changes.
    pub fn backspace(&mut self) -> Option<char> {
        let Cursor { col, row } = self.cursor;
        let line_count = self.lines.len();

        let Some(line) = self.lines.get_mut(row) else {
            tracing::warn!(
                "Cursor row {} out of range ({} lines), ignoring backspace",
                row,
                line_count
            );
            return None;
        };

        if col == 0 {
            return None;
        }

        let (offset, _) = line.char_indices().nth(col - 1)?;
        let erased = line.remove(offset);
        self.cursor.retreat();
        self.mark_dirty(row);
        Some(erased)
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line at `index`, or an empty string past the end
    pub fn line_at(&self, index: usize) -> &str {
        self.lines.get(index).map(String::as_str).unwrap_or("")
    }

    /// All lines in row order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn cursor_col(&self) -> usize {
        self.cursor.col
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor.row
    }

    /// Lowest row changed since the previous call, resetting the tracking
    pub fn take_dirty(&mut self) -> Option<usize> {
        self.dirty_from.take()
    }

    fn last_row(&mut self) -> usize {
        self.ensure_line();
        self.lines.len() - 1
    }

    fn mark_dirty(&mut self, row: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(row, |from| from.min(row)));
    }

    #[cfg(test)]
    pub(crate) fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buffer = LineBuffer::new();

        assert!(buffer.is_empty());
        assert_eq!(buffer.line_count(), 0);
        assert_eq!(buffer.line_at(0), "");
        assert_eq!(buffer.cursor(), Cursor::new());
    }

    #[test]
    fn test_append_seeds_first_line() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("hello");

        assert_eq!(buffer.lines(), ["hello"]);
        assert_eq!(buffer.cursor_col(), 5);
        assert_eq!(buffer.cursor_row(), 0);
    }

    #[test]
    fn test_append_counts_characters() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("héllo 世界");
        assert_eq!(buffer.cursor_col(), 8);

        buffer.append_char('!');
        assert_eq!(buffer.cursor_col(), 9);
        assert_eq!(buffer.line_at(0), "héllo 世界!");
    }

    #[test]
    fn test_newline() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("a");
        buffer.newline();
        buffer.append_text("b");

        assert_eq!(buffer.lines(), ["a", "b"]);
        assert_eq!(buffer.cursor(), Cursor::at(1, 1));
    }

    #[test]
    fn test_newline_on_empty_buffer() {
        let mut buffer = LineBuffer::new();
        buffer.newline();

        assert_eq!(buffer.lines(), ["", ""]);
        assert_eq!(buffer.cursor(), Cursor::at(0, 1));
    }

    #[test]
    fn test_backspace() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("abc");

        assert_eq!(buffer.backspace(), Some('c'));
        assert_eq!(buffer.line_at(0), "ab");
        assert_eq!(buffer.cursor_col(), 2);
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("a世");

        assert_eq!(buffer.backspace(), Some('世'));
        assert_eq!(buffer.line_at(0), "a");
        assert_eq!(buffer.cursor_col(), 1);
    }

    #[test]
    fn test_backspace_at_column_zero() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("abc");
        buffer.newline();
        let before = buffer.clone();

        assert_eq!(buffer.backspace(), None);
        assert_eq!(buffer.lines(), before.lines());
        assert_eq!(buffer.cursor(), before.cursor());
    }

    #[test]
    fn test_backspace_row_out_of_range() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("abc");
        buffer.set_cursor(Cursor::at(2, 7));

        assert_eq!(buffer.backspace(), None);
        assert_eq!(buffer.line_at(0), "abc");
    }

    #[test]
    fn test_backspace_column_past_end() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("ab");
        buffer.set_cursor(Cursor::at(5, 0));

        assert_eq!(buffer.backspace(), None);
        assert_eq!(buffer.line_at(0), "ab");
        assert_eq!(buffer.cursor_col(), 5);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut buffer = LineBuffer::new();
        buffer.append_text("a");
        buffer.newline();
        buffer.newline();
        assert_eq!(buffer.take_dirty(), Some(0));
        assert_eq!(buffer.take_dirty(), None);

        buffer.append_text("x");
        assert_eq!(buffer.take_dirty(), Some(2));
    }
}
