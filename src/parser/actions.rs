//! Terminal actions produced by the parser
//!
//! These actions represent the semantic meaning of the output stream: literal
//! text and the handful of controls the line buffer understands, plus
//! matched capability commands.

use serde::{Deserialize, Serialize};

use super::matcher::ParamKind;

/// Actions produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalAction {
    /// Append a character at the end of the current line
    Print(char),

    /// BEL (0x07), never changes the buffer
    Bell,

    /// BS (0x08)
    Backspace,

    /// A bare CR (0x0D) character, folded away in this terminal mode.
    /// The `cr` capability arrives as [`Command::CarriageReturn`] instead.
    CarriageReturn,

    /// LF (0x0A)
    NewLine,

    /// A complete control sequence
    Command(Command),
}

impl TerminalAction {
    /// Action for a character that is not part of a control sequence
    pub fn for_char(c: char) -> Self {
        match c {
            '\x07' => TerminalAction::Bell,
            '\x08' => TerminalAction::Backspace,
            '\r' => TerminalAction::CarriageReturn,
            '\n' => TerminalAction::NewLine,
            c => TerminalAction::Print(c),
        }
    }

    /// Check if this is a print action
    pub fn is_print(&self) -> bool {
        matches!(self, TerminalAction::Print(_))
    }

    /// Check if this is a command action
    pub fn is_command(&self) -> bool {
        matches!(self, TerminalAction::Command(_))
    }
}

/// Capability commands with defined handling
///
/// Names outside this set are carried as [`Command::Other`] and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// SGR color/attribute change (`color`)
    Color,
    /// Erase to end of line (`el`)
    EraseLine,
    /// `cr`
    CarriageReturn,
    /// `ind` / `nel` / `cud1` (line feed named by the database)
    LineFeed,
    /// `bel`
    Bell,
    /// `cub1`
    Backspace,
    /// Bracketed paste mode toggle sent by the shell
    BracketedPaste(bool),
    /// DCH: delete N characters
    DeleteChars(u32),
    /// ICH: insert N blank characters
    InsertChars(u32),
    /// Any other capability name
    Other(String),
}

impl Command {
    /// Map a capability name to a command
    pub fn from_capability(name: &str) -> Self {
        match name {
            "color" => Command::Color,
            "el" => Command::EraseLine,
            "cr" => Command::CarriageReturn,
            "ind" | "nel" | "cud1" => Command::LineFeed,
            "bel" => Command::Bell,
            "cub1" => Command::Backspace,
            "bracketed_paste_on" => Command::BracketedPaste(true),
            "bracketed_paste_off" => Command::BracketedPaste(false),
            other => Command::Other(other.to_string()),
        }
    }

    /// Map a structurally recognized parameterized sequence to a command
    pub fn from_param(kind: ParamKind, count: u32) -> Self {
        match kind {
            ParamKind::DeleteChars => Command::DeleteChars(count),
            ParamKind::InsertChars => Command::InsertChars(count),
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &str {
        match self {
            Command::Color => "color",
            Command::EraseLine => "el",
            Command::CarriageReturn => "cr",
            Command::LineFeed => "ind",
            Command::Bell => "bel",
            Command::Backspace => "cub1",
            Command::BracketedPaste(_) => "bracketed_paste",
            Command::DeleteChars(_) => "dch",
            Command::InsertChars(_) => "ich",
            Command::Other(name) => name,
        }
    }
}
