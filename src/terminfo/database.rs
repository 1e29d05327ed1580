//! Capability lookup by literal sequence

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::path::Path;

use super::dump::{tokenize, Field};
use super::{TermInfoResult, ESC};
use crate::parser::MatchResult;

/// Name reported for SGR sequences, which are stripped whether or not the
/// database lists them
pub const COLOR: &str = "color";

/// Literal control sequences of one terminal type, keyed by sequence
///
/// Immutable once built. Lookups go through an index keyed by the first
/// character of the sequence, with each bucket kept ordered so that prefix
/// queries are a single range probe.
#[derive(Debug, Clone, Default)]
pub struct CapabilityDatabase {
    /// Terminal name line (`linux|linux console`)
    name: Option<String>,
    /// Boolean capabilities
    flags: BTreeSet<String>,
    /// Numeric capabilities
    numbers: BTreeMap<String, i64>,
    /// sequence -> capability name, bucketed by first character
    sequences: HashMap<char, BTreeMap<String, String>>,
    len: usize,
}

impl CapabilityDatabase {
    /// Create an empty database (only the built-in SGR rule applies)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a database from `infocmp` output
    pub fn build(dump: &str) -> TermInfoResult<Self> {
        let mut database = Self::new();
        let mut parameterized = 0usize;

        for field in tokenize(dump)? {
            match field {
                Field::String { name, value } => {
                    // Capabilities with parameters can't be matched literally
                    if value.contains('%') {
                        parameterized += 1;
                        continue;
                    }
                    database.insert(value, name);
                }
                Field::Number { name, value } => {
                    database.numbers.insert(name, value);
                }
                Field::Flag(flag) => {
                    if database.name.is_none() {
                        database.name = Some(flag);
                    } else {
                        database.flags.insert(flag);
                    }
                }
            }
        }

        tracing::debug!(
            "Capability database for {:?}: {} sequences, {} parameterized skipped",
            database.name(),
            database.len,
            parameterized
        );

        Ok(database)
    }

    /// Build a database from a file containing `infocmp` output
    pub fn load(path: &Path) -> TermInfoResult<Self> {
        let dump = std::fs::read_to_string(path)?;
        Self::build(&dump)
    }

    /// Build a database directly from (sequence, name) pairs
    pub fn from_entries<I, S, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        S: Into<String>,
        N: Into<String>,
    {
        let mut database = Self::new();
        for (sequence, name) in entries {
            database.insert(sequence.into(), name.into());
        }
        database
    }

    fn insert(&mut self, sequence: String, name: String) {
        let Some(first) = sequence.chars().next() else {
            return;
        };
        let bucket = self.sequences.entry(first).or_default();
        match bucket.insert(sequence, name) {
            Some(previous) => tracing::debug!("Capability {} redefined", previous),
            None => self.len += 1,
        }
    }

    /// Terminal name as printed in the first field of the dump
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Check whether a boolean capability is set
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Get a numeric capability
    pub fn number(&self, name: &str) -> Option<i64> {
        self.numbers.get(name).copied()
    }

    /// Number of literal sequences
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exact lookup of a literal sequence
    pub fn get(&self, sequence: &str) -> Option<&str> {
        let first = sequence.chars().next()?;
        self.sequences
            .get(&first)?
            .get(sequence)
            .map(String::as_str)
    }

    /// Iterate over all (sequence, name) pairs
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sequences
            .values()
            .flat_map(|bucket| bucket.iter())
            .map(|(sequence, name)| (sequence.as_str(), name.as_str()))
    }

    /// Classify an accumulating sequence
    ///
    /// Never returns [`MatchResult::Parameterized`]; DCH/ICH are recognized by
    /// the [`SequenceMatcher`](crate::parser::SequenceMatcher) instead.
    pub fn find(&self, sequence: &str) -> MatchResult<'_> {
        let Some(first) = sequence.chars().next() else {
            return MatchResult::Unknown;
        };

        if sequence.len() == 1 && first == ESC {
            return MatchResult::Pending;
        }

        if let Some(result) = classify_sgr(sequence) {
            return result;
        }

        let Some(bucket) = self.sequences.get(&first) else {
            return MatchResult::Unknown;
        };

        if let Some(name) = bucket.get(sequence) {
            return MatchResult::Known(name.as_str());
        }

        // Keys sharing the prefix sort immediately after it
        let longer = bucket
            .range::<str, _>((Bound::Excluded(sequence), Bound::Unbounded))
            .next();
        match longer {
            Some((key, _)) if key.starts_with(sequence) => MatchResult::Pending,
            _ => MatchResult::Unknown,
        }
    }
}

/// `ESC [ <digits/semicolons>* m` is a color change; anything shorter of
/// the same shape may still become one
fn classify_sgr(sequence: &str) -> Option<MatchResult<'static>> {
    let body = sequence.strip_prefix("\x1b[")?;
    let is_param = |c: char| c.is_ascii_digit() || c == ';';

    match body.strip_suffix('m') {
        Some(params) if params.chars().all(is_param) => Some(MatchResult::Known(COLOR)),
        _ if body.chars().all(is_param) => Some(MatchResult::Pending),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_EXCERPT: &str = "\
#\tReconstructed via infocmp from file: /usr/share/terminfo/l/linux
linux|linux console,
\tam, bce, eo, mir, msgr, xenl, xon,
\tcolors#8, it#8, ncv#18, pairs#64,
\tbel=^G, civis=\\E[?25l\\E[?1c, clear=\\E[H\\E[J,
\tcnorm=\\E[?25h\\E[?0c, cr=\\r, cub=\\E[%p1%dD, cub1=\\b,
\tcud1=\\n, cup=\\E[%i%p1%d;%p2%dH, dch=\\E[%p1%dP, dch1=\\E[P, el=\\E[K,
\tind=\\n,
\tel1=\\E[1K, home=\\E[H, kcub1=\\E[D, kcuu1=\\E[A, sgr0=\\E[m,
";

    #[test]
    fn test_build_linux_excerpt() {
        let db = CapabilityDatabase::build(LINUX_EXCERPT).unwrap();

        assert_eq!(db.name(), "linux|linux console");
        assert!(db.has_flag("am"));
        assert!(db.has_flag("xon"));
        assert!(!db.has_flag("bw"));
        assert_eq!(db.number("colors"), Some(8));
        assert_eq!(db.number("pairs"), Some(64));

        assert_eq!(db.get("\r"), Some("cr"));
        // cud1 and ind share "\n"; the later field wins
        assert_eq!(db.get("\n"), Some("ind"));
        assert_eq!(db.get("\x1b[K"), Some("el"));
        assert_eq!(db.get("\x1b[?25l\x1b[?1c"), Some("civis"));
        // Caret notation is kept verbatim
        assert_eq!(db.get("^G"), Some("bel"));
    }

    #[test]
    fn test_build_drops_parameterized() {
        let db = CapabilityDatabase::build(LINUX_EXCERPT).unwrap();

        assert!(db.entries().all(|(_, name)| name != "cup"));
        assert!(db.entries().all(|(_, name)| name != "dch"));
        assert!(db.entries().any(|(_, name)| name == "dch1"));
    }

    #[test]
    fn test_build_malformed() {
        assert!(CapabilityDatabase::build("linux, el=\\E[K, cr=\\").is_err());
    }

    #[test]
    fn test_find_lone_escape_is_pending() {
        let db = CapabilityDatabase::new();
        assert_eq!(db.find("\x1b"), MatchResult::Pending);
    }

    #[test]
    fn test_find_known_pending_unknown() {
        let db = CapabilityDatabase::build(LINUX_EXCERPT).unwrap();

        assert_eq!(db.find("\x1b[K"), MatchResult::Known("el"));
        assert_eq!(db.find("\x1b[?"), MatchResult::Pending);
        assert_eq!(db.find("\x1b[?25l"), MatchResult::Pending);
        assert_eq!(db.find("\x1b[?25l\x1b[?1c"), MatchResult::Known("civis"));
        assert_eq!(db.find("\x1b[?7"), MatchResult::Unknown);
        assert_eq!(db.find("\x1bZ"), MatchResult::Unknown);
    }

    #[test]
    fn test_find_sgr_without_database_entry() {
        let db = CapabilityDatabase::new();

        assert_eq!(db.find("\x1b["), MatchResult::Pending);
        assert_eq!(db.find("\x1b[1;3"), MatchResult::Pending);
        assert_eq!(db.find("\x1b[1;31m"), MatchResult::Known(COLOR));
        assert_eq!(db.find("\x1b[m"), MatchResult::Known(COLOR));
        assert_eq!(db.find("\x1b[1x"), MatchResult::Unknown);
    }

    #[test]
    fn test_sgr_rule_precedes_database() {
        let db = CapabilityDatabase::build(LINUX_EXCERPT).unwrap();
        // sgr0 is in the database, but the built-in rule names it first
        assert_eq!(db.find("\x1b[m"), MatchResult::Known(COLOR));
    }

    #[test]
    fn test_find_empty_sequence() {
        let db = CapabilityDatabase::new();
        assert_eq!(db.find(""), MatchResult::Unknown);
    }

    #[test]
    fn test_from_entries_and_len() {
        let db = CapabilityDatabase::from_entries([("\r", "cr"), ("\x1b[K", "el")]);

        assert_eq!(db.len(), 2);
        assert!(!db.is_empty());
        assert_eq!(db.get("\r"), Some("cr"));
        assert_eq!(db.get("\n"), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linux.ti");
        std::fs::write(&path, LINUX_EXCERPT).unwrap();

        let db = CapabilityDatabase::load(&path).unwrap();
        assert_eq!(db.get("\x1b[H"), Some("home"));
    }
}
