//! Conversion between JSON and CBOR, the compact binary map format.

use crate::error::Result;
use crate::json::{json_values, JsonValues};
use crate::producer::{peek_byte, Flow, Producer};
use crate::transformer::Transformer;
use serde_json::Value;
use std::io::{BufReader, Read};

/// Encodes each JSON value of the input as one CBOR data item.
pub struct JsonToCbor<R: Read> {
    values: JsonValues<R, Value>,
}

impl<R: Read> JsonToCbor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            values: json_values(reader),
        }
    }
}

impl<R: Read> Producer for JsonToCbor<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let value = match self.values.next() {
            Some(value) => value?,
            None => return Ok(Flow::End),
        };
        ciborium::ser::into_writer(&value, &mut *chunk)?;
        Ok(Flow::Continue)
    }
}

/// Decodes a sequence of CBOR data items into compact JSON, one per chunk.
///
/// Map keys must be text strings; anything else fails decoding.
pub struct CborToJson<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> CborToJson<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }
}

impl<R: Read> Producer for CborToJson<R> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        // End of input between items is a clean end; inside an item it is not.
        if peek_byte(&mut self.reader)?.is_none() {
            return Ok(Flow::End);
        }
        let value: Value = ciborium::de::from_reader(&mut self.reader)?;
        serde_json::to_writer(&mut *chunk, &value)?;
        Ok(Flow::Continue)
    }
}

/// Converts JSON messages into CBOR messages.
pub fn json_to_cbor<R: Read>(reader: R) -> Transformer<JsonToCbor<R>> {
    Transformer::new(JsonToCbor::new(reader))
}

/// Converts CBOR messages into JSON messages.
pub fn cbor_to_json<R: Read>(reader: R) -> Transformer<CborToJson<R>> {
    Transformer::new(CborToJson::new(reader))
}
