//! Newline-delimited framing over a growable byte buffer.
//!
//! Receives append whatever bytes arrived; [`LineBuffer::next_line`] then
//! yields each complete `\n`-terminated line, leaving a trailing partial
//! line buffered for the next receive.

use serde::Serialize;

/// Accumulates raw socket bytes and splits them into protocol lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends newly received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pops the next complete line, without its terminator. Returns `None`
    /// once only an unterminated tail (or nothing) remains.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=pos).collect();
        // Invalid UTF-8 yields a lossy line that will fail to decode as
        // JSON and be skipped upstream, same as any malformed line.
        let mut text = String::from_utf8_lossy(&line).into_owned();
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Bytes currently held without a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// Encodes a record as one wire line: its JSON form plus the terminator.
pub fn encode<T: Serialize>(value: &T) -> String {
    let mut line = serde_json::to_string(value).unwrap_or_default();
    line.push('\n');
    line
}
