//! JSON re-formatting producers.
//!
//! Input is a stream of concatenated JSON values; each value becomes one chunk.

use crate::error::Result;
use crate::producer::{Flow, Producer};
use crate::transformer::Transformer;
use serde::de::DeserializeOwned;
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer, Value};
use std::io::Read;

/// Iterator over the JSON values of a reader, one per call.
pub(crate) type JsonValues<R, T> = StreamDeserializer<'static, IoRead<R>, T>;

pub(crate) fn json_values<R: Read, T: DeserializeOwned>(reader: R) -> JsonValues<R, T> {
    Deserializer::from_reader(reader).into_iter()
}

/// Output layout for [`JsonReformat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonStyle {
    /// Two-space indentation and line breaks.
    Pretty,
    /// No insignificant whitespace.
    #[default]
    Compact,
}

/// Re-serializes each JSON value of the input in the configured style.
///
/// Object keys come out in sorted order.
pub struct JsonReformat<R: Read> {
    values: JsonValues<R, Value>,
    style: JsonStyle,
}

impl<R: Read> JsonReformat<R> {
    pub fn new(reader: R, style: JsonStyle) -> Self {
        Self {
            values: json_values(reader),
            style,
        }
    }
}

impl<R: Read> Producer for JsonReformat<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let value = match self.values.next() {
            Some(value) => value?,
            None => return Ok(Flow::End),
        };
        match self.style {
            JsonStyle::Pretty => serde_json::to_writer_pretty(&mut *chunk, &value)?,
            JsonStyle::Compact => serde_json::to_writer(&mut *chunk, &value)?,
        }
        Ok(Flow::Continue)
    }
}

/// Converts JSON messages into a more human readable form using
/// indentation and line breaks.
pub fn json_to_pretty<R: Read>(reader: R) -> Transformer<JsonReformat<R>> {
    Transformer::new(JsonReformat::new(reader, JsonStyle::Pretty))
}

/// Converts JSON messages by removing all unneeded whitespace.
pub fn json_to_compact<R: Read>(reader: R) -> Transformer<JsonReformat<R>> {
    Transformer::new(JsonReformat::new(reader, JsonStyle::Compact))
}
