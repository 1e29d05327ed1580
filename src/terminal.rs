//! Terminal Executor
//!
//! Ties together the parser and the line buffer, and applies parsed actions
//! to update the terminal state. This is the main integration point between
//! parsing and the buffer the screen reader observes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Cursor, LineBuffer, Snapshot};
use crate::parser::{Command, Parser, TerminalAction};
use crate::speech::{Announcement, SpeechComposer};
use crate::terminfo::CapabilityDatabase;

/// Which half of a CR LF pair breaks the line
///
/// Only applies to CR and LF characters the capability database names
/// (`cr`, `ind`/`cud1`). A bare CR is always folded away and a bare LF
/// always starts a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarriageReturnPolicy {
    /// `cr` starts a new line and the database's line feed is ignored
    #[default]
    NewLine,
    /// `cr` is ignored and the database's line feed starts a new line
    Ignore,
}

/// Summary of what one batch did to the terminal
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchUpdate {
    /// Lowest row whose content changed, `None` if no line changed
    pub first_changed_row: Option<usize>,
    /// Line count after the batch
    pub line_count: usize,
    /// Cursor after the batch
    pub cursor: Cursor,
    /// Bell events raised by the batch
    pub bells: usize,
    /// What to say for the batch
    pub announcement: Option<Announcement>,
}

impl BatchUpdate {
    /// Whether the batch changed any line
    pub fn has_changes(&self) -> bool {
        self.first_changed_row.is_some()
    }
}

#[derive(Default)]
struct BatchState {
    bells: usize,
    speech: SpeechComposer,
}

/// Terminal executor that processes parsed actions and updates the buffer
#[derive(Debug, Clone)]
pub struct Terminal {
    /// The escape sequence parser
    parser: Parser,
    /// The line buffer
    buffer: LineBuffer,
    carriage_return: CarriageReturnPolicy,
    /// Reused between batches
    actions: Vec<TerminalAction>,
}

impl Terminal {
    /// Create a terminal matching sequences against `database`
    pub fn new(database: Arc<CapabilityDatabase>) -> Self {
        Self {
            parser: Parser::new(database),
            buffer: LineBuffer::new(),
            carriage_return: CarriageReturnPolicy::default(),
            actions: Vec::new(),
        }
    }

    /// Set which of the `cr` and line feed capabilities breaks the line
    pub fn with_carriage_return(mut self, policy: CarriageReturnPolicy) -> Self {
        self.carriage_return = policy;
        self
    }

    /// Get a reference to the line buffer
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Get a reference to the parser
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn carriage_return(&self) -> CarriageReturnPolicy {
        self.carriage_return
    }

    /// Capture the buffer and cursor
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_buffer(&self.buffer)
    }

    /// Interpret one batch of output text
    pub fn term_text(&mut self, text: &str) -> BatchUpdate {
        self.buffer.take_dirty();
        if !text.is_empty() {
            self.buffer.ensure_line();
        }

        let mut actions = std::mem::take(&mut self.actions);
        self.parser.feed_into(text, &mut actions);

        let mut batch = BatchState::default();
        for action in actions.drain(..) {
            self.apply_action(action, &mut batch);
        }
        self.actions = actions;

        let update = BatchUpdate {
            first_changed_row: self.buffer.take_dirty(),
            line_count: self.buffer.line_count(),
            cursor: self.buffer.cursor(),
            bells: batch.bells,
            announcement: batch.speech.finish(),
        };
        tracing::trace!(
            "Batch of {} chars: {} lines, {} bells",
            text.chars().count(),
            update.line_count,
            update.bells
        );
        update
    }

    /// Apply a single parsed action to the buffer
    fn apply_action(&mut self, action: TerminalAction, batch: &mut BatchState) {
        match action {
            TerminalAction::Print(c) => {
                self.buffer.append_char(c);
                batch.speech.push(c);
            }
            TerminalAction::Bell => {
                batch.bells += 1;
            }
            TerminalAction::Backspace => self.backspace(batch),
            TerminalAction::CarriageReturn => {
                // Folded into the LF that follows
                batch.speech.push_break();
            }
            TerminalAction::NewLine => self.newline(batch),
            TerminalAction::Command(command) => self.execute_command(command, batch),
        }
    }

    /// Execute a matched capability command
    fn execute_command(&mut self, command: Command, batch: &mut BatchState) {
        match command {
            Command::Color | Command::EraseLine | Command::BracketedPaste(_) => {
                tracing::debug!("Ignoring {}", command.name());
            }
            Command::CarriageReturn => match self.carriage_return {
                CarriageReturnPolicy::NewLine => self.newline(batch),
                CarriageReturnPolicy::Ignore => batch.speech.push_break(),
            }
            Command::LineFeed => match self.carriage_return {
                CarriageReturnPolicy::NewLine => {
                    tracing::debug!("Line feed folded into the preceding cr");
                }
                CarriageReturnPolicy::Ignore => self.newline(batch),
            }
            Command::Bell => batch.bells += 1,
            Command::Backspace => self.backspace(batch),
            Command::DeleteChars(n) | Command::InsertChars(n) => {
                tracing::debug!("{} {} not applied to the buffer", command.name(), n);
            }
            Command::Other(name) => {
                tracing::warn!("Unknown terminal command: {}", name);
            }
        }
    }

    fn newline(&mut self, batch: &mut BatchState) {
        self.buffer.newline();
        batch.speech.push_break();
    }

    fn backspace(&mut self, batch: &mut BatchState) {
        if let Some(erased) = self.buffer.backspace() {
            batch.speech.erased(erased);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(entries: &[(&str, &str)]) -> Terminal {
        let database = CapabilityDatabase::from_entries(entries.iter().copied());
        Terminal::new(Arc::new(database))
    }

    #[test]
    fn test_terminal_print() {
        let mut term = terminal(&[]);
        let update = term.term_text("Hello, World!");

        assert_eq!(term.buffer().lines(), ["Hello, World!"]);
        assert_eq!(update.first_changed_row, Some(0));
        assert_eq!(update.line_count, 1);
        assert_eq!(update.cursor, Cursor::at(13, 0));
        assert_eq!(
            update.announcement,
            Some(Announcement::Text("Hello, World!".to_string()))
        );
    }

    #[test]
    fn test_terminal_empty_batch() {
        let mut term = terminal(&[]);
        let update = term.term_text("");

        assert!(term.buffer().is_empty());
        assert!(!update.has_changes());
        assert_eq!(update.announcement, None);
    }

    #[test]
    fn test_terminal_newlines() {
        let mut term = terminal(&[]);
        term.term_text("a\nb\nc");

        assert_eq!(term.buffer().lines(), ["a", "b", "c"]);
        assert_eq!(term.buffer().cursor(), Cursor::at(1, 2));
    }

    #[test]
    fn test_terminal_bare_cr_is_folded() {
        let mut term = terminal(&[]);
        term.term_text("ls\r\nfile");

        assert_eq!(term.buffer().lines(), ["ls", "file"]);
    }

    #[test]
    fn test_terminal_cr_capability() {
        let mut term = terminal(&[("\r", "cr")]);
        term.term_text("line1\rline2");

        assert_eq!(term.buffer().lines(), ["line1", "line2"]);
    }

    #[test]
    fn test_terminal_cr_capability_ignored() {
        let mut term = terminal(&[("\r", "cr")]).with_carriage_return(CarriageReturnPolicy::Ignore);
        let update = term.term_text("line1\rline2");

        assert_eq!(term.buffer().lines(), ["line1line2"]);
        assert_eq!(
            update.announcement,
            Some(Announcement::Text("line1 line2".to_string()))
        );
    }

    #[test]
    fn test_terminal_crlf_capabilities_break_once() {
        let entries = [("\r", "cr"), ("\n", "ind")];

        let mut term = terminal(&entries);
        term.term_text("$ ls\r\nfile\r\n");
        assert_eq!(term.buffer().lines(), ["$ ls", "file", ""]);

        let mut term = terminal(&entries).with_carriage_return(CarriageReturnPolicy::Ignore);
        term.term_text("$ ls\r\nfile\r\n");
        assert_eq!(term.buffer().lines(), ["$ ls", "file", ""]);
    }

    #[test]
    fn test_terminal_colors_stripped() {
        let mut term = terminal(&[]);
        term.term_text("\x1b[1;31mHello\x1b[0m");

        assert_eq!(term.buffer().lines(), ["Hello"]);
    }

    #[test]
    fn test_terminal_bell() {
        let mut term = terminal(&[("\x07", "bel")]);
        let update = term.term_text("\x07ab\x07");

        assert_eq!(update.bells, 2);
        assert_eq!(term.buffer().lines(), ["ab"]);
    }

    #[test]
    fn test_terminal_backspace_announces_erased() {
        let mut term = terminal(&[("\x1b[K", "el")]);
        term.term_text("cat");
        let update = term.term_text("\x08\x1b[K");

        assert_eq!(term.buffer().lines(), ["ca"]);
        assert_eq!(update.first_changed_row, Some(0));
        assert_eq!(update.announcement, Some(Announcement::Letter('t')));
    }

    #[test]
    fn test_terminal_cub1_backspaces() {
        let mut term = terminal(&[("\x08", "cub1")]);
        term.term_text("ab\x08");

        assert_eq!(term.buffer().lines(), ["a"]);
    }

    #[test]
    fn test_terminal_delete_chars_not_applied() {
        let mut term = terminal(&[]);
        term.term_text("abc");
        let update = term.term_text("\x1b[2P");

        assert_eq!(term.buffer().lines(), ["abc"]);
        assert!(!update.has_changes());
    }

    #[test]
    fn test_terminal_unknown_command_is_noop() {
        let mut term = terminal(&[("\x1b[?25l", "civis")]);
        term.term_text("x\x1b[?25l");

        assert_eq!(term.buffer().lines(), ["x"]);
    }

    #[test]
    fn test_terminal_bracketed_paste_silenced() {
        let mut term = terminal(&[]);
        term.term_text("\x1b[?2004h$ \x1b[?2004l");

        assert_eq!(term.buffer().lines(), ["$ "]);
    }

    #[test]
    fn test_terminal_dirty_rows() {
        let mut term = terminal(&[]);
        term.term_text("one\ntwo");
        let update = term.term_text("\nthree");

        assert_eq!(update.first_changed_row, Some(2));
        assert_eq!(update.line_count, 3);
    }

    #[test]
    fn test_terminal_snapshot() {
        let mut term = terminal(&[]);
        term.term_text("$ ls");

        let snapshot = term.snapshot();
        assert_eq!(snapshot.lines, vec!["$ ls"]);
        assert_eq!(snapshot.cursor_col, 4);
    }
}
