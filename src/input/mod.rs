//! Input Encoding Module
//!
//! Translates key presses into the bytes written to the shell's pty.
//!
//! # Keyboard Encoding
//!
//! - Control characters below 0x20 are sent as a single byte
//! - Printable characters are sent UTF-8 encoded
//! - Arrow keys use the normal-mode `CSI A/B/C/D` form
//!
//! Outbound keystrokes are not validated or transformed beyond this.

use std::io::{self, Write};

/// Keys that can be sent to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character
    Char(char),
    /// Ctrl held with a character (`Ctrl('d')` is EOT)
    Ctrl(char),

    // Editing
    Enter,
    Tab,
    Backspace,
    Escape,

    // Cursor keys
    Up,
    Down,
    Left,
    Right,
}

/// Encode a key press into the bytes the shell expects
pub fn encode_key(key: Key) -> Vec<u8> {
    match key {
        Key::Char(c) => encode_char(c),
        Key::Ctrl(c) => encode_ctrl(c),

        // Editing keys
        Key::Enter => vec![b'\n'],
        Key::Tab => vec![b'\t'],
        Key::Backspace => vec![0x08],
        Key::Escape => vec![0x1b],

        // Cursor keys
        Key::Up => encode_cursor_key(b'A'),
        Key::Down => encode_cursor_key(b'B'),
        Key::Right => encode_cursor_key(b'C'),
        Key::Left => encode_cursor_key(b'D'),
    }
}

/// Encode a key press and write it to `writer`
pub fn write_key<W: Write>(writer: &mut W, key: Key) -> io::Result<()> {
    writer.write_all(&encode_key(key))?;
    writer.flush()
}

/// Encode a cursor key (arrow keys)
fn encode_cursor_key(code: u8) -> Vec<u8> {
    vec![0x1b, b'[', code]
}

/// Encode a character as UTF-8
pub fn encode_char(c: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf).as_bytes().to_vec()
}

/// Ctrl+key produces the matching C0 control character
fn encode_ctrl(c: char) -> Vec<u8> {
    match c.to_ascii_uppercase() {
        c @ '@'..='_' => vec![(c as u8) - b'@'],
        '?' => vec![0x7f],
        ' ' => vec![0x00],
        _ => encode_char(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_keys() {
        assert_eq!(encode_key(Key::Up), b"\x1b[A");
        assert_eq!(encode_key(Key::Down), b"\x1b[B");
        assert_eq!(encode_key(Key::Right), b"\x1b[C");
        assert_eq!(encode_key(Key::Left), b"\x1b[D");
    }

    #[test]
    fn test_editing_keys() {
        assert_eq!(encode_key(Key::Enter), b"\n");
        assert_eq!(encode_key(Key::Tab), b"\t");
        assert_eq!(encode_key(Key::Backspace), b"\x08");
        assert_eq!(encode_key(Key::Escape), b"\x1b");
    }

    #[test]
    fn test_encode_char() {
        assert_eq!(encode_key(Key::Char('a')), b"a");
        assert_eq!(encode_key(Key::Char('é')), "é".as_bytes());
        assert_eq!(encode_key(Key::Char('世')), "世".as_bytes());
    }

    #[test]
    fn test_ctrl_keys() {
        assert_eq!(encode_key(Key::Ctrl('d')), [0x04]);
        assert_eq!(encode_key(Key::Ctrl('C')), [0x03]);
        assert_eq!(encode_key(Key::Ctrl('[')), [0x1b]);
        assert_eq!(encode_key(Key::Ctrl(' ')), [0x00]);
        assert_eq!(encode_key(Key::Ctrl('?')), [0x7f]);
        // No control form, sent as typed
        assert_eq!(encode_key(Key::Ctrl('1')), b"1");
    }

    #[test]
    fn test_write_key() {
        let mut out = Vec::new();
        write_key(&mut out, Key::Char('l')).unwrap();
        write_key(&mut out, Key::Char('s')).unwrap();
        write_key(&mut out, Key::Enter).unwrap();

        assert_eq!(out, b"ls\n");
    }
}
