//! Binary buffer utilities for the dmap codec.
//!
//! The dmap wire format is little-endian throughout, so unlike most network
//! codecs every multi-byte read and write here is LE.
//!
//! # Overview
//!
//! - [`Writer`] - Writes binary data to an auto-growing buffer
//! - [`StreamReader`] - Blocking reads from any [`std::io::Read`] source,
//!   including the one-byte-at-a-time reads used for record resynchronization
//!
//! # Example
//!
//! ```
//! use dmap_buffers::{StreamReader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.i32(-2);
//! writer.cstr("hello");
//! let data = writer.flush();
//!
//! let mut reader = StreamReader::new(&data[..]);
//! assert_eq!(reader.u8().unwrap(), 0x01);
//! assert_eq!(reader.i32().unwrap(), -2);
//! assert_eq!(reader.cstr().unwrap(), "hello");
//! ```

mod stream;
mod writer;

pub use stream::StreamReader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The source ended before the requested bytes were available.
    EndOfStream,
    /// Invalid UTF-8 sequence in a zero-terminated string.
    InvalidUtf8,
    /// An I/O error other than end-of-stream.
    Io(std::io::ErrorKind),
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfStream => write!(f, "end of stream"),
            BufferError::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            BufferError::Io(kind) => write!(f, "i/o error: {kind}"),
        }
    }
}

impl std::error::Error for BufferError {}

impl From<std::io::Error> for BufferError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => BufferError::EndOfStream,
            kind => BufferError::Io(kind),
        }
    }
}
