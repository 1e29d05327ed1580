//! Sequence matcher
//!
//! Classifies the escape sequence being accumulated by the parser. The
//! parameterized DCH/ICH forms (`ESC [ <digits> P` and `ESC [ <digits> @`)
//! are tracked structurally, one character at a time, and take priority over
//! the capability database, which never stores parameterized forms.

use std::sync::Arc;

use crate::terminfo::{CapabilityDatabase, ESC};

/// Sequences the shell emits that are not terminal capabilities and carry
/// nothing worth showing
const SILENCED: [(&str, &str); 2] = [
    ("\x1b[?2004h", "bracketed_paste_on"),
    ("\x1b[?2004l", "bracketed_paste_off"),
];

/// Classification of an accumulating sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult<'a> {
    /// Complete sequence naming a capability
    Known(&'a str),
    /// Can never match; abandon
    Unknown,
    /// Strict prefix of at least one known form; keep reading
    Pending,
    /// Complete DCH/ICH sequence with its count
    Parameterized(ParamKind, u32),
}

/// Parameterized sequences recognized structurally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// DCH, `ESC [ n P`
    DeleteChars,
    /// ICH, `ESC [ n @`
    InsertChars,
}

/// Incremental recognizer for `ESC [ <digits> (P|@)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParamProbe {
    #[default]
    Start,
    Escape,
    Introducer,
    Digits(u32),
    Dead,
}

impl ParamProbe {
    fn advance(self, c: char) -> (Self, Option<(ParamKind, u32)>) {
        match (self, c) {
            (ParamProbe::Start, ESC) => (ParamProbe::Escape, None),
            (ParamProbe::Escape, '[') => (ParamProbe::Introducer, None),
            (ParamProbe::Introducer, '0'..='9') => {
                (ParamProbe::Digits(c.to_digit(10).unwrap_or(0)), None)
            }
            (ParamProbe::Digits(n), '0'..='9') => {
                let n = n
                    .saturating_mul(10)
                    .saturating_add(c.to_digit(10).unwrap_or(0));
                (ParamProbe::Digits(n), None)
            }
            (ParamProbe::Digits(n), 'P') => (ParamProbe::Dead, Some((ParamKind::DeleteChars, n))),
            (ParamProbe::Digits(n), '@') => (ParamProbe::Dead, Some((ParamKind::InsertChars, n))),
            _ => (ParamProbe::Dead, None),
        }
    }
}

/// Matches escape sequences against a capability database
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    database: Arc<CapabilityDatabase>,
    probe: ParamProbe,
}

impl SequenceMatcher {
    pub fn new(database: Arc<CapabilityDatabase>) -> Self {
        Self {
            database,
            probe: ParamProbe::Start,
        }
    }

    pub fn database(&self) -> &CapabilityDatabase {
        &self.database
    }

    /// Forget any partially recognized parameterized sequence
    pub fn reset(&mut self) {
        self.probe = ParamProbe::Start;
    }

    /// Start a new sequence whose ESC has already been consumed
    pub fn begin(&mut self) {
        self.probe = ParamProbe::Escape;
    }

    /// Classify `sequence` after `c` has been appended to it
    ///
    /// Must be called for every appended character so the structural
    /// recognizer stays in step with the sequence.
    pub fn push(&mut self, c: char, sequence: &str) -> MatchResult<'_> {
        let (probe, complete) = self.probe.advance(c);
        self.probe = probe;
        if let Some((kind, count)) = complete {
            return MatchResult::Parameterized(kind, count);
        }

        if let Some(&(_, name)) = SILENCED.iter().find(|(silenced, _)| *silenced == sequence) {
            return MatchResult::Known(name);
        }

        match self.database.find(sequence) {
            MatchResult::Unknown
                if SILENCED
                    .iter()
                    .any(|(silenced, _)| silenced.starts_with(sequence)) =>
            {
                MatchResult::Pending
            }
            result => result,
        }
    }

    /// Capability named by a single control character, if any
    pub fn control(&self, c: char) -> Option<&str> {
        if !c.is_control() || c == ESC {
            return None;
        }
        let mut buf = [0u8; 4];
        self.database.get(c.encode_utf8(&mut buf))
    }
}
