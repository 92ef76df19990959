//! Text producers: rotation, upper-casing, line filtering and trimming.
//!
//! Each producer pulls from any `Read`, including another transformer, and
//! picks its own chunk size: a fixed read buffer, one character or one line.

use crate::error::Result;
use crate::producer::{peek_byte, read_retrying, Flow, Producer};
use crate::transformer::Transformer;
use regex::bytes::Regex;
use std::io::{BufRead, BufReader, Read};

const DEFAULT_ROT13_BUFFER: usize = 256;

/// Rotates ASCII letters by 13 places. Applying it twice is the identity.
pub struct Rot13<R: Read> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: Read> Rot13<R> {
    pub fn new(reader: R) -> Self {
        Self::with_buffer_size(reader, DEFAULT_ROT13_BUFFER)
    }

    /// Reads at most `size` bytes per chunk (at least one).
    pub fn with_buffer_size(reader: R, size: usize) -> Self {
        Self {
            reader,
            buf: vec![0; size.max(1)],
        }
    }
}

fn rotate(b: u8) -> u8 {
    match b {
        b'a'..=b'z' => (b - b'a' + 13) % 26 + b'a',
        b'A'..=b'Z' => (b - b'A' + 13) % 26 + b'A',
        _ => b,
    }
}

impl<R: Read> Producer for Rot13<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let n = read_retrying(&mut self.reader, &mut self.buf)?;
        if n == 0 {
            return Ok(Flow::End);
        }
        chunk.extend(self.buf[..n].iter().copied().map(rotate));
        Ok(Flow::Continue)
    }
}

/// Upper-cases text one character at a time. Unicode aware.
///
/// Bytes that do not form valid UTF-8 come out as U+FFFD, one per byte, and
/// decoding resumes at the next byte. An overlong or surrogate sequence such
/// as `E0 80 80` therefore yields three replacement characters.
pub struct ToUpper<R: Read> {
    reader: BufReader<R>,
    // Bytes taken from `reader` but not yet decoded.
    pending: [u8; 4],
    pending_len: usize,
}

impl<R: Read> ToUpper<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: [0; 4],
            pending_len: 0,
        }
    }

    fn take_byte(&mut self) -> Result<bool> {
        match peek_byte(&mut self.reader)? {
            Some(b) => {
                self.reader.consume(1);
                self.pending[self.pending_len] = b;
                self.pending_len += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reads one UTF-8 encoded character. `Ok(None)` at end of input.
    fn read_char(&mut self) -> Result<Option<char>> {
        if self.pending_len == 0 && !self.take_byte()? {
            return Ok(None);
        }

        let width = utf8_width(self.pending[0]);
        while self.pending_len < width && self.take_byte()? {}

        let decoded = if width > 0 && self.pending_len >= width {
            std::str::from_utf8(&self.pending[..width])
                .ok()
                .and_then(|s| s.chars().next())
        } else {
            None
        };
        let used = if decoded.is_some() { width } else { 1 };
        self.pending.copy_within(used..self.pending_len, 0);
        self.pending_len -= used;

        Ok(Some(decoded.unwrap_or(char::REPLACEMENT_CHARACTER)))
    }
}

impl<R: Read> Producer for ToUpper<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let Some(c) = self.read_char()? else {
            return Ok(Flow::End);
        };
        let mut utf8 = [0u8; 4];
        for upper in c.to_uppercase() {
            chunk.extend_from_slice(upper.encode_utf8(&mut utf8).as_bytes());
        }
        Ok(Flow::Continue)
    }
}

// Width of a UTF-8 sequence from its first byte; 0 for bytes that cannot start one.
fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// Passes through only the lines matching a regular expression.
pub struct LineMatcher<R: Read> {
    reader: BufReader<R>,
    pattern: Regex,
    line: Vec<u8>,
}

impl<R: Read> LineMatcher<R> {
    /// # Errors
    /// `Error::Pattern` if `pattern` is not a valid regular expression.
    pub fn new(reader: R, pattern: &str) -> Result<Self> {
        Ok(Self {
            reader: BufReader::new(reader),
            pattern: Regex::new(pattern)?,
            line: Vec::new(),
        })
    }
}

impl<R: Read> Producer for LineMatcher<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(Flow::End);
            }
            if self.pattern.is_match(&self.line) {
                chunk.extend_from_slice(&self.line);
                return Ok(Flow::Continue);
            }
        }
    }
}

/// Trims leading and trailing whitespace from every line.
///
/// Unicode whitespace (such as U+00A0 or U+3000) is trimmed on lines that are
/// valid UTF-8; other lines are trimmed of ASCII whitespace only. Every output
/// line ends in `\n`, including a last input line that had none.
pub struct Trimmer<R: Read> {
    reader: BufReader<R>,
    line: Vec<u8>,
}

impl<R: Read> Trimmer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: Vec::new(),
        }
    }
}

impl<R: Read> Producer for Trimmer<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(Flow::End);
        }
        let trimmed = match std::str::from_utf8(&self.line) {
            Ok(line) => line.trim().as_bytes(),
            Err(_) => self.line.trim_ascii(),
        };
        chunk.extend_from_slice(trimmed);
        chunk.push(b'\n');
        Ok(Flow::Continue)
    }
}

/// Rot13 transformation with the default 256-byte read buffer.
pub fn rot13<R: Read>(reader: R) -> Transformer<Rot13<R>> {
    Transformer::new(Rot13::new(reader))
}

/// Convert text to upper case, one character per chunk.
pub fn to_upper<R: Read>(reader: R) -> Transformer<ToUpper<R>> {
    Transformer::new(ToUpper::new(reader))
}

/// Filter lines matching `pattern`.
pub fn line_matcher<R: Read>(reader: R, pattern: &str) -> Result<Transformer<LineMatcher<R>>> {
    Ok(Transformer::new(LineMatcher::new(reader, pattern)?))
}

/// Trim space from all lines.
pub fn trimmer<R: Read>(reader: R) -> Transformer<Trimmer<R>> {
    Transformer::new(Trimmer::new(reader))
}
