//! The adapter between chunk producers and their two kinds of consumers.

use crate::error::{Error, Result};
use crate::producer::{Flow, Producer};
use std::io::{self, BufRead, Read};
use tracing::{debug, trace, warn};

/// The condition that permanently stops a transformer.
#[derive(Debug, Clone)]
pub enum Terminal {
    /// The producer has no more data. Treated as successful completion.
    End,
    /// The producer failed. Bytes delivered before it remain valid.
    Failed(Error),
}

impl Terminal {
    pub fn is_end(&self) -> bool {
        matches!(self, Terminal::End)
    }

    /// The failure, if this is not a clean end of data.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Terminal::End => None,
            Terminal::Failed(e) => Some(e),
        }
    }

    /// `Ok(())` for a clean end, otherwise a clone of the failure.
    pub fn to_result(&self) -> Result<()> {
        match self {
            Terminal::End => Ok(()),
            Terminal::Failed(e) => Err(e.clone()),
        }
    }
}

/// Lifecycle of a transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No terminal condition yet; leftover bytes may be pending.
    Fresh,
    /// A terminal condition is recorded but stream bytes are still pending.
    Terminated,
    /// A terminal condition is recorded and every byte has been delivered.
    Exhausted,
}

/// One chunk as returned by [`Transformer::read_message`].
///
/// The final chunk and the terminal condition arrive together, so a message
/// may carry both a non-empty payload and `Some(terminal)`.
#[derive(Debug)]
pub struct Message<'a> {
    pub payload: &'a [u8],
    pub terminal: Option<&'a Terminal>,
}

impl<'a> Message<'a> {
    /// True if this message carries the end-of-data sentinel.
    pub fn is_end(&self) -> bool {
        self.terminal.is_some_and(Terminal::is_end)
    }

    /// True if no further messages will follow this one.
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Turns a chunk [`Producer`] into a message reader and a byte-stream reader.
///
/// It provides two ways to consume the same sequence of chunks:
///
/// 1. **Message API** (`read_message()`, `messages()`, `process_all()`): one
///    producer chunk per call, exactly as produced.
/// 2. **Stream API** (`std::io::Read` and `std::io::BufRead`): as many bytes as
///    fit in the caller's buffer; the rest of a chunk is kept for the next read.
///
/// A terminal condition reported by the producer is recorded once and handed
/// out again on every later call. On the stream side it is withheld until
/// every byte produced before it has been read.
///
/// Because a transformer is itself `Read`, any producer that pulls from a
/// reader can pull from another transformer, which is how pipelines are built:
///
/// ```rust
/// use transflow::text::{rot13, to_upper};
/// use std::io::{Cursor, Read};
///
/// let mut out = String::new();
/// to_upper(rot13(Cursor::new("Hello World"))).read_to_string(&mut out)?;
/// assert_eq!(out, "URYYB JBEYQ");
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// A transformer is not meant to be shared between threads while reading;
/// wrap it in a `Mutex` if it has to be.
pub struct Transformer<P: Producer> {
    producer: P,
    // Current chunk. Stream leftover is `buffer[cursor..]`.
    buffer: Vec<u8>,
    cursor: usize,
    terminal: Option<Terminal>,
}

impl<P: Producer> Transformer<P> {
    /// Creates a new `Transformer`. The producer is not called until the
    /// first read.
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            buffer: Vec::new(),
            cursor: 0,
            terminal: None,
        }
    }

    /// Reads the next chunk exactly as the producer yielded it.
    ///
    /// After the terminal condition has been delivered, every call returns an
    /// empty payload with the same terminal and the producer is left alone.
    ///
    /// # Errors
    /// `Error::PendingStreamBytes` if part of the current chunk has already
    /// been consumed through the `Read` interface and the rest is still
    /// pending. Producer failures are never returned here; they arrive as
    /// `Terminal::Failed` in the message.
    pub fn read_message(&mut self) -> Result<Message<'_>> {
        let pending = self.pending();
        if pending > 0 {
            warn!(pending, "message read while stream bytes are pending");
            return Err(Error::PendingStreamBytes { pending });
        }
        if self.terminal.is_some() {
            return Ok(Message {
                payload: &[],
                terminal: self.terminal.as_ref(),
            });
        }
        self.fetch();
        // The whole chunk goes to this caller; none of it is left for `read`.
        self.cursor = self.buffer.len();
        Ok(Message {
            payload: &self.buffer,
            terminal: self.terminal.as_ref(),
        })
    }

    /// Returns a cursor over the message side of the transformer.
    ///
    /// Unlike `read_message`, the cursor skips empty chunks and turns the
    /// terminal condition into `Ok(None)` or `Err(_)`.
    pub fn messages(&mut self) -> Messages<'_, P> {
        Messages { transformer: self }
    }

    /// Processes all remaining messages with a closure.
    ///
    /// The closure receives each non-empty chunk and should return `Ok(())`
    /// to continue or an error to stop. A producer failure is returned after
    /// the chunk that accompanied it has been processed.
    pub fn process_all<F>(&mut self, mut processor: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let mut messages = self.messages();
        while let Some(payload) = messages.next()? {
            processor(payload)?;
        }
        Ok(())
    }

    /// Number of bytes of the current chunk still waiting for a stream read.
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn state(&self) -> State {
        match self.terminal {
            None => State::Fresh,
            Some(_) if self.pending() > 0 => State::Terminated,
            Some(_) => State::Exhausted,
        }
    }

    /// True once the producer has reported its terminal condition.
    pub fn is_terminated(&self) -> bool {
        self.terminal.is_some()
    }

    /// The recorded terminal condition, if any.
    pub fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    pub fn get_ref(&self) -> &P {
        &self.producer
    }

    pub fn get_mut(&mut self) -> &mut P {
        &mut self.producer
    }

    /// Consumes the transformer, returning the producer. Pending bytes are dropped.
    pub fn into_inner(self) -> P {
        self.producer
    }

    // Replaces the current chunk with the next one from the producer and
    // records a terminal condition if the producer reported one.
    fn fetch(&mut self) {
        debug_assert!(self.terminal.is_none());
        self.buffer.clear();
        self.cursor = 0;
        match self.producer.produce(&mut self.buffer) {
            Ok(Flow::Continue) => {
                trace!(len = self.buffer.len(), "chunk produced");
            }
            Ok(Flow::End) => {
                debug!(len = self.buffer.len(), "producer reached end of data");
                self.terminal = Some(Terminal::End);
            }
            Err(e) => {
                debug!(len = self.buffer.len(), error = %e, "producer failed");
                self.terminal = Some(Terminal::Failed(e));
            }
        }
    }
}

impl<P: Producer> Read for Transformer<P> {
    /// Copies up to `buf.len()` bytes of the chunk stream into `buf`.
    ///
    /// `Ok(0)` means end of data (or an empty `buf`). Empty chunks are not
    /// reported; the producer is asked again until it yields bytes or stops.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<P: Producer> BufRead for Transformer<P> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        loop {
            if self.cursor < self.buffer.len() {
                return Ok(&self.buffer[self.cursor..]);
            }
            if let Some(terminal) = &self.terminal {
                return match terminal {
                    Terminal::End => Ok(&[]),
                    Terminal::Failed(e) => Err(e.clone().into()),
                };
            }
            self.fetch();
        }
    }

    fn consume(&mut self, amt: usize) {
        self.cursor = (self.cursor + amt).min(self.buffer.len());
    }
}

/// A cursor over the message side of a [`Transformer`].
///
/// It borrows the `Transformer` mutably, so stream reads cannot interleave
/// with it.
pub struct Messages<'a, P: Producer> {
    transformer: &'a mut Transformer<P>,
}

impl<'a, P: Producer> Messages<'a, P> {
    /// Returns the next non-empty chunk.
    ///
    /// # Returns
    /// * `Ok(Some(payload))` - A chunk was read
    /// * `Ok(None)` - End of data reached
    /// * `Err(e)` - The producer failed (or stream bytes were pending)
    pub fn next(&mut self) -> Result<Option<&[u8]>> {
        loop {
            let (len, terminal) = {
                let message = self.transformer.read_message()?;
                (message.payload.len(), message.terminal.cloned())
            };
            if len > 0 {
                // A terminal that came with this chunk is reported by the next call.
                return Ok(Some(&self.transformer.buffer));
            }
            if let Some(terminal) = terminal {
                return terminal.to_result().map(|()| None);
            }
        }
    }
}
