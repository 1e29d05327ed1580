//! Terminfo dump tokenizer
//!
//! `infocmp` prints a terminal description as comma-separated fields spread
//! over several indented lines:
//!
//! ```text
//! #	Reconstructed via infocmp from file: /usr/share/terminfo/l/linux
//! linux|linux console,
//! 	am, bce, eo, mir, msgr,
//! 	colors#8, it#8, ncv#18, pairs#64,
//! 	bel=^G, civis=\E[?25l\E[?1c, clear=\E[H\E[J, cr=\r,
//! ```
//!
//! Comment lines are dropped, whitespace is collapsed, and backslash escapes
//! inside each field are decoded before the field is classified.

use super::{TermInfoError, TermInfoResult, ESC};

/// A single decoded field of a terminfo dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// `name=value` string capability, value already decoded
    String { name: String, value: String },
    /// `name#value` numeric capability
    Number { name: String, value: i64 },
    /// A field without `=` or a valid `#`: the terminal name or a boolean flag
    Flag(String),
}

/// Split a dump into decoded fields
///
/// Fails only when the text cannot be tokenized: a backslash at the very end
/// of the input, or a numeric escape that does not name a character.
pub fn tokenize(text: &str) -> TermInfoResult<Vec<Field>> {
    let joined = strip_comments(text);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut space_pending = false;
    let mut chars = joined.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c == ',' {
            push_field(&mut fields, &current);
            current.clear();
            space_pending = false;
            continue;
        }

        if c.is_whitespace() {
            space_pending = !current.is_empty();
            continue;
        }

        if space_pending {
            current.push(' ');
            space_pending = false;
        }

        if c != '\\' {
            current.push(c);
            continue;
        }

        let Some((_, escaped)) = chars.next() else {
            return Err(TermInfoError::Malformed {
                offset,
                reason: "unterminated escape",
            });
        };

        match escaped {
            'E' | 'e' => current.push(ESC),
            'n' | 'N' => current.push('\n'),
            'r' | 'R' => current.push('\r'),
            '0'..='9' => {
                let mut code = escaped.to_digit(10).unwrap_or(0);
                while let Some(digit) = chars.peek().and_then(|&(_, d)| d.to_digit(10)) {
                    chars.next();
                    code = code
                        .checked_mul(10)
                        .and_then(|code| code.checked_add(digit))
                        .ok_or(TermInfoError::Malformed {
                            offset,
                            reason: "character code out of range",
                        })?;
                }
                let decoded = char::from_u32(code).ok_or(TermInfoError::Malformed {
                    offset,
                    reason: "character code is not a valid character",
                })?;
                current.push(decoded);
            }
            // Kept as written, so `cub1=\b` never matches a real BS
            other => {
                current.push('\\');
                current.push(other);
            }
        }
    }

    push_field(&mut fields, &current);
    Ok(fields)
}

/// Drop blank lines and `#` comments, joining what remains
fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `raw` carries no outer whitespace from the dump; decoded `\r` and `\n`
/// are part of the value and must be kept.
fn push_field(fields: &mut Vec<Field>, raw: &str) {
    if raw.is_empty() {
        return;
    }

    if let Some((name, value)) = raw.split_once('=') {
        fields.push(Field::String {
            name: name.to_string(),
            value: value.to_string(),
        });
        return;
    }

    if let Some((name, value)) = raw.split_once('#') {
        if let Some(value) = parse_number(value) {
            fields.push(Field::Number {
                name: name.to_string(),
                value,
            });
            return;
        }
    }

    fields.push(Field::Flag(raw.to_string()));
}

/// infocmp prints large numbers in hex (`pairs#0x10000`)
fn parse_number(text: &str) -> Option<i64> {
    match text.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
