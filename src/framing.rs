//! Defines how schema messages are delimited in a byte stream.

use crate::error::{Error, Result};
use crate::producer::read_retrying;
use std::io::Read;

/// Maximum number of bytes a u64 varint can occupy: ceil(64 / 7).
const MAX_VARINT_BYTES: usize = 10;

//--- Framing Trait and Implementations ---

/// A strategy for writing and reading message boundaries.
///
/// Purpose: keep the wire delimiting separate from message encoding, so the
/// schema producers can carry one message per stream or many.
pub trait Framing {
    /// Whether more than one message may share a stream.
    fn multi_message(&self) -> bool;

    /// Appends `payload`, framed, to `out`.
    fn frame(&self, out: &mut Vec<u8>, payload: &[u8]) -> Result<()>;

    /// Reads the next payload into `buffer`.
    /// Returns Ok(Some(())) on success, Ok(None) on clean EOF.
    fn read_and_deframe<R: Read>(&self, reader: &mut R, buffer: &mut Vec<u8>)
        -> Result<Option<()>>;
}

/// No delimiting: the whole stream is a single message.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unframed;

impl Framing for Unframed {
    fn multi_message(&self) -> bool {
        false
    }

    fn frame(&self, out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
        out.extend_from_slice(payload);
        Ok(())
    }

    fn read_and_deframe<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<()>> {
        buffer.clear();
        if reader.read_to_end(buffer)? == 0 {
            return Ok(None);
        }
        Ok(Some(()))
    }
}

/// Each message is prefixed with its length as an unsigned LEB128 varint:
/// `[varint length | payload]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VarintDelimited;

impl Framing for VarintDelimited {
    fn multi_message(&self) -> bool {
        true
    }

    fn frame(&self, out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
        encode_varint(payload.len() as u64, out);
        out.extend_from_slice(payload);
        Ok(())
    }

    fn read_and_deframe<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<()>> {
        let payload_len = match read_varint(reader)? {
            Some(len) => len,
            None => return Ok(None),
        };
        read_payload(reader, buffer, payload_len)?;
        Ok(Some(()))
    }
}

fn read_payload<R: Read>(reader: &mut R, buffer: &mut Vec<u8>, payload_len: u64) -> Result<()> {
    buffer.clear();
    reader.take(payload_len).read_to_end(buffer)?;
    if buffer.len() as u64 != payload_len {
        return Err(Error::UnexpectedEof);
    }
    Ok(())
}

/// Encode `value` as an unsigned LEB128 varint, appending 1 to 10 bytes to `out`.
///
/// | Value   | Encoded bytes        |
/// |---------|----------------------|
/// | 0       | `[0x00]`             |
/// | 127     | `[0x7F]`             |
/// | 128     | `[0x80, 0x01]`       |
/// | 300     | `[0xAC, 0x02]`       |
/// | 16384   | `[0x80, 0x80, 0x01]` |
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        // Take the lowest 7 bits
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            // More bytes to come: set the continuation bit
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Read an unsigned LEB128 varint from `reader`, one byte at a time.
///
/// # Returns
/// * `Ok(Some(value))` - A varint was read
/// * `Ok(None)` - The reader was already at end of input
///
/// # Errors
/// * `Error::UnexpectedEof` if input ends mid-varint
/// * `Error::InvalidFrame` if more than 10 bytes carry the continuation bit
pub fn read_varint<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut byte = [0u8; 1];

    for i in 0..MAX_VARINT_BYTES {
        if read_retrying(reader, &mut byte)? == 0 {
            if i == 0 {
                return Ok(None);
            }
            return Err(Error::UnexpectedEof);
        }
        result |= u64::from(byte[0] & 0x7F) << shift;
        shift += 7;
        if byte[0] & 0x80 == 0 {
            return Ok(Some(result));
        }
    }
    Err(Error::invalid_frame("varint length prefix is too long"))
}

/// A composable adapter that enforces a maximum payload length for any framing.
///
/// Failure semantics: Returns `Error::InvalidFrame` with context (declared_len/limit) when exceeded.
pub struct BoundedFraming<F: Framing> {
    inner: F,
    max: usize,
}

impl<F: Framing> BoundedFraming<F> {
    pub fn new(inner: F, max: usize) -> Self {
        Self { inner, max }
    }

    fn check(&self, len: usize) -> Result<()> {
        if len > self.max {
            return Err(Error::invalid_frame_with(
                "payload length exceeds configured limit",
                Some(len),
                Some(self.max),
            ));
        }
        Ok(())
    }
}

impl<F: Framing> Framing for BoundedFraming<F> {
    fn multi_message(&self) -> bool {
        self.inner.multi_message()
    }

    fn frame(&self, out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
        self.check(payload.len())?;
        self.inner.frame(out, payload)
    }

    fn read_and_deframe<R: Read>(
        &self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
    ) -> Result<Option<()>> {
        // Never read more than one byte past the limit.
        let mut limited = reader.take(self.max as u64 + MAX_VARINT_BYTES as u64 + 1);
        let result = self.inner.read_and_deframe(&mut limited, buffer);
        match result {
            Ok(Some(())) => {
                self.check(buffer.len())?;
                Ok(Some(()))
            }
            // A truncated read may only mean the limit cut the frame short.
            Err(Error::UnexpectedEof) if limited.limit() == 0 => {
                Err(Error::invalid_frame_with(
                    "payload length exceeds configured limit",
                    None,
                    Some(self.max),
                ))
            }
            other => other,
        }
    }
}

//--- Fluent Extension Traits ---

/// Extension methods for framings to enable fluent composition without importing adapter types.
pub trait FramingExt: Framing + Sized {
    /// Enforce a maximum payload length.
    fn bounded(self, max: usize) -> BoundedFraming<Self> {
        BoundedFraming::new(self, max)
    }
}

impl<T: Framing> FramingExt for T {}
