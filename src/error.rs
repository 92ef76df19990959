use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Custom error types for the transflow library.
///
/// A recorded terminal failure is handed out again on every read after it
/// occurs, so `Error` is `Clone`. Sources that are not `Clone` themselves are
/// held behind an `Arc`.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Underlying I/O errors from std::io operations.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// Malformed JSON input or a JSON serialization failure.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(Arc<serde_json::Error>),

    /// CBOR serialization failure.
    #[cfg(feature = "cbor")]
    #[error("CBOR encode error: {0}")]
    CborEncode(Arc<ciborium::ser::Error<io::Error>>),

    /// Malformed CBOR input.
    #[cfg(feature = "cbor")]
    #[error("CBOR decode error: {0}")]
    CborDecode(Arc<ciborium::de::Error<io::Error>>),

    /// FlatBuffers verification failure while decoding a schema message.
    #[cfg(feature = "schema")]
    #[error("FlatBuffers error: {0}")]
    FlatbuffersError(#[from] flatbuffers::InvalidFlatbuffer),

    /// A line filter pattern failed to compile.
    #[cfg(feature = "text")]
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid frame error for malformed frames (e.g., over-long length prefix).
    #[error("Invalid frame: {message}")]
    InvalidFrame {
        message: String,
        declared_len: Option<usize>,
        limit: Option<usize>,
    },

    /// Unexpected end of file inside a frame or a multi-byte sequence.
    #[error("Unexpected end of file while reading stream")]
    UnexpectedEof,

    /// A second message arrived on a stream configured for a single message.
    #[error("Not a multi-message stream")]
    NotMultiMessage,

    /// A bounded producer yielded a chunk above its configured limit.
    #[error("Chunk of {len} bytes exceeds limit of {limit} bytes")]
    ChunkTooLarge { len: usize, limit: usize },

    /// A message read was attempted while stream-read bytes of the current
    /// chunk were still pending.
    #[error("Message read with {pending} stream bytes still pending")]
    PendingStreamBytes { pending: usize },
}

impl Error {
    /// Create a new `InvalidFrame` error with a descriptive message.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
            declared_len: None,
            limit: None,
        }
    }

    /// Create a new `InvalidFrame` error carrying the offending length and limit.
    pub fn invalid_frame_with(
        message: impl Into<String>,
        declared_len: Option<usize>,
        limit: Option<usize>,
    ) -> Self {
        Self::InvalidFrame {
            message: message.into(),
            declared_len,
            limit,
        }
    }

    /// The `io::ErrorKind` this error is reported as on the stream side.
    ///
    /// Never `Interrupted`: a recorded terminal is permanent, and callers such
    /// as `read_to_end` retry interrupted reads.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Error::Io(e) if e.kind() == io::ErrorKind::Interrupted => io::ErrorKind::Other,
            Error::Io(e) => e.kind(),
            Error::UnexpectedEof => io::ErrorKind::UnexpectedEof,
            Error::PendingStreamBytes { .. } => io::ErrorKind::Other,
            _ => io::ErrorKind::InvalidData,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Errors that crossed an upstream transformer's `Read` boundary are
        // unwrapped so they reach the consumer unchanged.
        if let Some(inner) = err.get_ref().and_then(|e| e.downcast_ref::<Error>()) {
            return inner.clone();
        }
        Error::Io(Arc::new(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            // serde_json only keeps the io::Error behind its own wrapper;
            // round-trip through io::Error to recover nested crate errors.
            return Error::from(io::Error::from(err));
        }
        Error::Json(Arc::new(err))
    }
}

#[cfg(feature = "cbor")]
impl From<ciborium::ser::Error<io::Error>> for Error {
    fn from(err: ciborium::ser::Error<io::Error>) -> Self {
        match err {
            ciborium::ser::Error::Io(e) => Error::from(e),
            other => Error::CborEncode(Arc::new(other)),
        }
    }
}

#[cfg(feature = "cbor")]
impl From<ciborium::de::Error<io::Error>> for Error {
    fn from(err: ciborium::de::Error<io::Error>) -> Self {
        match err {
            ciborium::de::Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Error::UnexpectedEof
            }
            ciborium::de::Error::Io(e) => Error::from(e),
            other => Error::CborDecode(Arc::new(other)),
        }
    }
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;
