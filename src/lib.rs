//! # transflow
//!
//! Pull-based chunk transformers with a message reader and a byte-stream reader.
//!
//! ## Overview
//!
//! A [`Transformer`] wraps a [`Producer`], anything that can produce the next
//! chunk of data on request, and lets it be consumed in two ways:
//!
//! * **one chunk at a time** through [`Transformer::read_message`], or
//! * **as a byte stream** through [`std::io::Read`], with reads of any size.
//!   Bytes that do not fit the caller's buffer are kept for the next read.
//!
//! The producer's terminal condition (end of data or a failure) is recorded
//! once, handed out on every later call, and never reported before the bytes
//! that preceded it.
//!
//! ## Pipelines
//!
//! A transformer is itself `Read`, and the producers in this crate pull from
//! any `Read`, so transformers nest into lazily evaluated pipelines:
//!
//! ```rust
//! use transflow::text::{line_matcher, to_upper, trimmer};
//! use std::io::{Cursor, Read};
//!
//! let phrases = "  lacy timber \n\t\thybrid gossiping\t\n coy radioactivity\nrocky arrow  \n";
//!
//! // Keep lines containing 'o', trim them, upper-case them.
//! let mut r = to_upper(trimmer(line_matcher(Cursor::new(phrases), "o")?));
//!
//! let mut out = String::new();
//! r.read_to_string(&mut out)?;
//! assert_eq!(out, "HYBRID GOSSIPING\nCOY RADIOACTIVITY\nROCKY ARROW\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! * **`Producer`**: the single-method contract every chunk source implements
//! * **`Transformer`**: the adapter; owns the leftover bytes and the terminal
//! * **Producers**: text ([`text`]), JSON ([`json`]), CBOR ([`cbor`]),
//!   FlatBuffers schemas ([`schema`], [`framing`]) and gzip ([`gzip`]), each
//!   behind a cargo feature of the same name

pub mod error;
pub mod framing;
pub mod producer;
pub mod transformer;

#[cfg(feature = "cbor")]
pub mod cbor;
#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "schema")]
pub mod schema;
#[cfg(feature = "text")]
pub mod text;

// Re-export the main public API for user convenience.
pub use error::{Error, Result};
pub use framing::{BoundedFraming, Framing, FramingExt, Unframed, VarintDelimited};
pub use producer::{
    from_fn, BoundedProducer, Flow, FnProducer, ObservedProducer, Producer, ProducerExt,
};
pub use transformer::{Message, Messages, State, Terminal, Transformer};

#[cfg(feature = "schema")]
pub use schema::Schema;
