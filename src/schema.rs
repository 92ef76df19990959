//! Conversion between JSON and schema-defined FlatBuffers messages.
//!
//! The schema is a user type implementing [`Schema`]: serde describes its
//! JSON form, and `encode`/`decode` describe its FlatBuffers form (typically a
//! thin wrapper around flatc-generated accessors).

use crate::error::{Error, Result};
use crate::framing::Framing;
use crate::json::{json_values, JsonValues};
use crate::producer::{Flow, Producer};
use crate::transformer::Transformer;
use flatbuffers::FlatBufferBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufReader, Read};
use std::marker::PhantomData;

/// A message type with a JSON form and a FlatBuffers form.
pub trait Schema: Serialize + DeserializeOwned {
    /// Serializes the message using the provided FlatBuffer builder.
    ///
    /// The implementation is responsible for calling `builder.finish()` or a
    /// related method to finalize the buffer.
    fn encode<A: flatbuffers::Allocator>(&self, builder: &mut FlatBufferBuilder<A>) -> Result<()>;

    /// Verifies `payload` and reads a message out of it.
    ///
    /// # Errors
    /// `Error::FlatbuffersError` if the buffer fails verification.
    fn decode(payload: &[u8]) -> Result<Self>;
}

/// Reads JSON messages and writes them as framed FlatBuffers.
pub struct JsonToSchema<R: Read, M: Schema, F: Framing> {
    values: JsonValues<R, M>,
    framing: F,
    builder: FlatBufferBuilder<'static>,
    count: usize,
}

impl<R: Read, M: Schema, F: Framing> JsonToSchema<R, M, F> {
    pub fn new(reader: R, framing: F) -> Self {
        Self {
            values: json_values(reader),
            framing,
            builder: FlatBufferBuilder::new(),
            count: 0,
        }
    }
}

impl<R: Read, M: Schema, F: Framing> Producer for JsonToSchema<R, M, F> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        let message = match self.values.next() {
            Some(message) => message?,
            None => return Ok(Flow::End),
        };
        if self.count > 0 && !self.framing.multi_message() {
            return Err(Error::NotMultiMessage);
        }
        // Reuse the builder's allocation across messages.
        self.builder.reset();
        message.encode(&mut self.builder)?;
        self.framing.frame(chunk, self.builder.finished_data())?;
        self.count += 1;
        Ok(Flow::Continue)
    }
}

/// Reads framed FlatBuffers messages and writes them as compact JSON.
pub struct SchemaToJson<R: Read, M: Schema, F: Framing> {
    reader: BufReader<R>,
    framing: F,
    payload: Vec<u8>,
    _phantom: PhantomData<fn() -> M>, // M is only named in method calls
}

impl<R: Read, M: Schema, F: Framing> SchemaToJson<R, M, F> {
    pub fn new(reader: R, framing: F) -> Self {
        Self {
            reader: BufReader::new(reader),
            framing,
            payload: Vec::new(),
            _phantom: PhantomData,
        }
    }
}

impl<R: Read, M: Schema, F: Framing> Producer for SchemaToJson<R, M, F> {
    fn produce(&mut self, chunk: &mut Vec<u8>) -> Result<Flow> {
        if self
            .framing
            .read_and_deframe(&mut self.reader, &mut self.payload)?
            .is_none()
        {
            return Ok(Flow::End);
        }
        let message = M::decode(&self.payload)?;
        serde_json::to_writer(&mut *chunk, &message)?;
        Ok(Flow::Continue)
    }
}

/// Converts JSON messages into FlatBuffers messages of schema `M`.
///
/// With [`Unframed`](crate::framing::Unframed) only one message is allowed
/// and a second one fails with `Error::NotMultiMessage`. With
/// [`VarintDelimited`](crate::framing::VarintDelimited) each message is
/// length-prefixed so many can share the stream.
pub fn json_to_schema<M: Schema, R: Read, F: Framing>(
    reader: R,
    framing: F,
) -> Transformer<JsonToSchema<R, M, F>> {
    Transformer::new(JsonToSchema::new(reader, framing))
}

/// Converts FlatBuffers messages of schema `M` into JSON.
///
/// The framing must match the one the messages were written with.
pub fn schema_to_json<M: Schema, R: Read, F: Framing>(
    reader: R,
    framing: F,
) -> Transformer<SchemaToJson<R, M, F>> {
    Transformer::new(SchemaToJson::new(reader, framing))
}
