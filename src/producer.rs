//! The chunk producer contract and its composable adapters.

use crate::error::{Error, Result};
use std::io::{self, BufRead, Read};

/// What a producer reports alongside the chunk it just wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// More chunks may follow.
    Continue,
    /// The chunk just written (possibly empty) is the last one.
    End,
}

/// A source of chunks driven by a [`Transformer`](crate::Transformer).
///
/// Each call appends the next chunk to `chunk`, which the caller clears
/// beforehand. Returning `Ok(Flow::End)` or `Err(_)` is terminal: whatever was
/// written to `chunk` in that call is delivered ahead of the terminal
/// condition, and the producer is never called again.
///
/// An empty chunk with `Ok(Flow::Continue)` is legal and does not end the
/// stream.
pub trait Producer {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow>;
}

impl<P: Producer + ?Sized> Producer for &mut P {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        (**self).produce(chunk)
    }
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        (**self).produce(chunk)
    }
}

/// A producer backed by a closure. See [`from_fn`].
pub struct FnProducer<F> {
    f: F,
}

/// Creates a producer from a closure with the same signature as
/// [`Producer::produce`].
///
/// ```rust
/// use transflow::{from_fn, Flow, Transformer};
/// use std::io::Read;
///
/// let mut parts = vec![&b"world"[..], &b"hello "[..]];
/// let mut t = Transformer::new(from_fn(move |chunk: &mut Vec<u8>| {
///     match parts.pop() {
///         Some(p) => {
///             chunk.extend_from_slice(p);
///             Ok(Flow::Continue)
///         }
///         None => Ok(Flow::End),
///     }
/// }));
///
/// let mut out = String::new();
/// t.read_to_string(&mut out)?;
/// assert_eq!(out, "hello world");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn from_fn<F>(f: F) -> FnProducer<F>
where
    F: FnMut(&mut Vec<u8>) -> Result<Flow>,
{
    FnProducer { f }
}

impl<F> Producer for FnProducer<F>
where
    F: FnMut(&mut Vec<u8>) -> Result<Flow>,
{
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        (self.f)(chunk)
    }
}

/// A composable adapter that enforces a maximum chunk length for any producer.
///
/// Failure semantics: a chunk longer than the limit is discarded and the call
/// fails with `Error::ChunkTooLarge`, which the transformer records as terminal.
pub struct BoundedProducer<P: Producer> {
    inner: P,
    max: usize,
}

impl<P: Producer> BoundedProducer<P> {
    pub fn new(inner: P, max: usize) -> Self {
        Self { inner, max }
    }
}

impl<P: Producer> Producer for BoundedProducer<P> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let result = self.inner.produce(chunk);
        if chunk.len() > self.max {
            let len = chunk.len();
            chunk.clear();
            return Err(Error::ChunkTooLarge {
                len,
                limit: self.max,
            });
        }
        result
    }
}

/// An adapter that allows observing chunks without copying or mutating.
///
/// Callback timing: invoked exactly once per producer call, after the inner
/// producer returns, whether or not that call was terminal.
pub struct ObservedProducer<P: Producer, C: FnMut(&[u8])> {
    inner: P,
    callback: C,
}

impl<P: Producer, C: FnMut(&[u8])> ObservedProducer<P, C> {
    pub fn new(inner: P, callback: C) -> Self {
        Self { inner, callback }
    }
}

impl<P: Producer, C: FnMut(&[u8])> Producer for ObservedProducer<P, C> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let result = self.inner.produce(chunk);
        (self.callback)(chunk);
        result
    }
}

/// Extension methods for producers to enable fluent composition without importing adapter types.
pub trait ProducerExt: Producer + Sized {
    /// Enforce a maximum chunk length.
    fn bounded(self, max: usize) -> BoundedProducer<Self> {
        BoundedProducer::new(self, max)
    }

    /// Observe chunks as they are produced. Useful for metrics/logging.
    fn observed<C: FnMut(&[u8])>(self, callback: C) -> ObservedProducer<Self, C> {
        ObservedProducer::new(self, callback)
    }
}

impl<T: Producer> ProducerExt for T {}

/// `Read::read` that retries `ErrorKind::Interrupted`.
///
/// Producers pull through this so an interrupted source read is never
/// recorded as a terminal failure.
pub(crate) fn read_retrying<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// The next buffered byte without consuming it, retrying `Interrupted`.
/// `Ok(None)` at end of input.
#[cfg_attr(not(any(feature = "text", feature = "cbor")), allow(dead_code))]
pub(crate) fn peek_byte<B: BufRead + ?Sized>(reader: &mut B) -> io::Result<Option<u8>> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
