//! Gzip compression and decompression producers.

use crate::error::Result;
use crate::producer::{read_retrying, Flow, Producer};
use crate::transformer::Transformer;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

const READ_BUFFER_SIZE: usize = 4096;

/// Compresses its input into a gzip stream.
///
/// A chunk is emitted whenever the compressor has output ready, so chunk
/// sizes follow the deflate block structure rather than the input reads.
pub struct Gzipper<R: Read> {
    reader: R,
    encoder: Option<GzEncoder<Vec<u8>>>,
    buf: Vec<u8>,
}

impl<R: Read> Gzipper<R> {
    pub fn new(reader: R) -> Self {
        Self::with_level(reader, Compression::default())
    }

    pub fn with_level(reader: R, level: Compression) -> Self {
        Self {
            reader,
            encoder: Some(GzEncoder::new(Vec::new(), level)),
            buf: vec![0; READ_BUFFER_SIZE],
        }
    }
}

impl<R: Read> Producer for Gzipper<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        loop {
            let Some(encoder) = self.encoder.as_mut() else {
                return Ok(Flow::End);
            };
            let n = read_retrying(&mut self.reader, &mut self.buf)?;
            if n == 0 {
                // Input is done: flush the remaining blocks and the trailer.
                if let Some(encoder) = self.encoder.take() {
                    chunk.extend_from_slice(&encoder.finish()?);
                }
                return Ok(Flow::End);
            }
            encoder.write_all(&self.buf[..n])?;
            let ready = encoder.get_mut();
            if !ready.is_empty() {
                chunk.append(ready);
                return Ok(Flow::Continue);
            }
        }
    }
}

/// Decompresses a gzip stream, up to 4 KiB per chunk.
///
/// Concatenated gzip members are decoded one after another as a single stream.
pub struct Gunzipper<R: Read> {
    decoder: MultiGzDecoder<R>,
    buf: Vec<u8>,
}

impl<R: Read> Gunzipper<R> {
    pub fn new(reader: R) -> Self {
        Self {
            decoder: MultiGzDecoder::new(reader),
            buf: vec![0; READ_BUFFER_SIZE],
        }
    }
}

impl<R: Read> Producer for Gunzipper<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let n = read_retrying(&mut self.decoder, &mut self.buf)?;
        if n == 0 {
            return Ok(Flow::End);
        }
        chunk.extend_from_slice(&self.buf[..n]);
        Ok(Flow::Continue)
    }
}

/// Gzip the input reader.
pub fn gzipper<R: Read>(reader: R) -> Transformer<Gzipper<R>> {
    Transformer::new(Gzipper::new(reader))
}

/// Gunzip the input reader.
pub fn gunzipper<R: Read>(reader: R) -> Transformer<Gunzipper<R>> {
    Transformer::new(Gunzipper::new(reader))
}
