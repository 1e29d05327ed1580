//! Streaming UTF-8 decoding
//!
//! Raw reads can end in the middle of a multi-byte character. The decoder
//! keeps the incomplete tail until the next read completes it. Invalid
//! bytes become U+FFFD so that every byte still shows up as something.

/// Incremental UTF-8 decoder
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    /// Incomplete sequence carried over from the previous read (at most 3 bytes)
    partial: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an incomplete character is being held
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty()
    }

    /// Decode `bytes`, appending complete characters to `out`
    pub fn decode(&mut self, bytes: &[u8], out: &mut String) {
        let mut input = std::mem::take(&mut self.partial);
        input.extend_from_slice(bytes);

        let consumed = decode_prefix(&input, out);
        input.drain(..consumed);
        self.partial = input;
    }

    /// End of stream: an incomplete trailing character becomes U+FFFD
    pub fn finish(&mut self, out: &mut String) {
        if !self.partial.is_empty() {
            self.partial.clear();
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }
}

/// Decode as much of `input` as possible, returning the number of bytes
/// consumed. Only an incomplete sequence at the very end is left over.
fn decode_prefix(input: &[u8], out: &mut String) -> usize {
    let mut rest = input;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return input.len();
            }
            Err(error) => {
                let (valid, after) = rest.split_at(error.valid_up_to());
                out.push_str(&String::from_utf8_lossy(valid));
                match error.error_len() {
                    Some(invalid) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[invalid..];
                    }
                    None => return input.len() - after.len(),
                }
            }
        }
    }
}
