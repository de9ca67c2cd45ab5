//! Error type for dmap encoding, decoding, and record manipulation.

use thiserror::Error;

use crate::value::WireType;

/// Error type for dmap operations.
///
/// All failures are local and synchronous; the codec never retries. Encode
/// failures leave no partial output because the full byte sequence is
/// assembled before emission. Decode failures abort at the first bad field
/// and discard the partially decoded record; resynchronization on the magic
/// marker is the only built-in recovery, and it only finds the next record
/// boundary.
#[derive(Debug, Error)]
pub enum DmapError {
    /// A value's wire type disagrees with the field's declared type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// An array's length disagrees with its dimensions, or an override's
    /// shape disagrees with the declared shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// An override targets a name the schema never declared.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// A tag byte outside the known-type table.
    #[error("unknown type code {0}")]
    UnknownType(u8),
    /// A reserved tag the codec recognizes but cannot carry.
    #[error("wire type {0} is reserved but not supported by this codec")]
    UnsupportedType(WireType),
    /// The stream ended before a declared field's bytes were available.
    #[error("stream ended mid-record")]
    TruncatedStream,
    /// A wire-invariant violation at emission time, e.g. an embedded NUL
    /// in a text value.
    #[error("encode error: {0}")]
    EncodeError(String),
    /// A structurally impossible record, e.g. a negative dimension count.
    #[error("malformed record: {0}")]
    Malformed(&'static str),
    /// The configured resynchronization budget was exhausted before a
    /// magic marker was found.
    #[error("resync budget of {0} bytes exhausted")]
    ResyncExhausted(usize),
    /// An I/O error from the underlying stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dmap_buffers::BufferError> for DmapError {
    fn from(err: dmap_buffers::BufferError) -> Self {
        match err {
            dmap_buffers::BufferError::EndOfStream => DmapError::TruncatedStream,
            dmap_buffers::BufferError::InvalidUtf8 => {
                DmapError::Malformed("invalid UTF-8 in field name or text value")
            }
            dmap_buffers::BufferError::Io(kind) => DmapError::Io(kind.into()),
        }
    }
}
