//! Parser State Machine
//!
//! Consumes the output stream one character at a time. Outside of an escape
//! sequence characters map straight to actions; after ESC the characters are
//! collected and matched against the capability database until the sequence
//! is recognized, proven unknown, or grows past [`MAX_CMD_LEN`].
//!
//! # States
//!
//! - Idle: no sequence in progress
//! - Collecting: `pending` holds ESC and the characters read after it
//!
//! Every character ends up either in an action or, for recognized sequences,
//! in a command. Unknown and overlong sequences are flushed back out as
//! literal text so nothing the shell printed is lost.
//!
//! All state lives in the parser, so feeding a string in one call or one
//! character per call produces the same actions.

use std::sync::Arc;

use super::actions::{Command, TerminalAction};
use super::matcher::{MatchResult, SequenceMatcher};
use crate::terminfo::{CapabilityDatabase, ESC};

/// Longest escape sequence the parser will hold, ESC included
pub const MAX_CMD_LEN: usize = 16;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Collecting,
}

/// The terminal parser
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    matcher: SequenceMatcher,
    /// Escape sequence collected so far, starting with ESC
    pending: String,
    /// Length of `pending` in characters
    pending_len: usize,
}

impl Parser {
    /// Create a new parser in the idle state
    pub fn new(database: Arc<CapabilityDatabase>) -> Self {
        Self {
            state: State::Idle,
            matcher: SequenceMatcher::new(database),
            pending: String::with_capacity(MAX_CMD_LEN * 4),
            pending_len: 0,
        }
    }

    pub fn database(&self) -> &CapabilityDatabase {
        self.matcher.database()
    }

    /// Drop any partial sequence and return to the idle state
    pub fn reset(&mut self) {
        self.clear_pending();
    }

    /// Whether an escape sequence is being collected
    pub fn is_collecting(&self) -> bool {
        self.state == State::Collecting
    }

    /// The partial escape sequence, empty when idle
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Length of the partial escape sequence in characters
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }

    /// Process a chunk of text, returning actions
    pub fn feed(&mut self, text: &str) -> Vec<TerminalAction> {
        let mut actions = Vec::with_capacity(text.len());
        self.feed_into(text, &mut actions);
        actions
    }

    /// Process a chunk of text, appending actions to `actions`
    pub fn feed_into(&mut self, text: &str, actions: &mut Vec<TerminalAction>) {
        for c in text.chars() {
            self.advance(c, actions);
        }
    }

    /// Process a single character
    pub fn advance(&mut self, c: char, actions: &mut Vec<TerminalAction>) {
        match self.state {
            State::Idle => self.advance_idle(c, actions),
            State::Collecting => self.advance_collecting(c, actions),
        }
    }

    fn advance_idle(&mut self, c: char, actions: &mut Vec<TerminalAction>) {
        if c == ESC {
            self.begin();
            return;
        }

        if let Some(name) = self.matcher.control(c) {
            actions.push(TerminalAction::Command(Command::from_capability(name)));
            return;
        }

        actions.push(TerminalAction::for_char(c));
    }

    fn advance_collecting(&mut self, c: char, actions: &mut Vec<TerminalAction>) {
        if c == ESC {
            self.flush_literal(actions);
            self.begin();
            return;
        }

        if self.pending_len >= MAX_CMD_LEN {
            tracing::debug!(
                "Escape sequence overflow, flushing {:?} as text",
                self.pending
            );
            self.flush_literal(actions);
            self.advance_idle(c, actions);
            return;
        }

        self.pending.push(c);
        self.pending_len += 1;

        let command = match self.matcher.push(c, &self.pending) {
            MatchResult::Pending => return,
            MatchResult::Known(name) => Command::from_capability(name),
            MatchResult::Parameterized(kind, count) => Command::from_param(kind, count),
            MatchResult::Unknown => {
                // `c` ended the sequence but is read on its own
                self.pending.pop();
                self.pending_len -= 1;
                self.flush_literal(actions);
                self.advance_idle(c, actions);
                return;
            }
        };

        actions.push(TerminalAction::Command(command));
        self.clear_pending();
    }

    fn begin(&mut self) {
        self.pending.clear();
        self.pending.push(ESC);
        self.pending_len = 1;
        self.state = State::Collecting;
        self.matcher.begin();
    }

    /// Emit the pending sequence as literal characters and go idle
    fn flush_literal(&mut self, actions: &mut Vec<TerminalAction>) {
        actions.extend(self.pending.chars().map(TerminalAction::for_char));
        self.clear_pending();
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
        self.pending_len = 0;
        self.state = State::Idle;
        self.matcher.reset();
    }
}
