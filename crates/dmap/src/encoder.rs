//! dmap record encoder.
//!
//! Wire layout (all integers little-endian):
//!
//! ```text
//! Header:  magic(i32) totalSize(i32) scalarCount(i32) vectorCount(i32)
//! Scalar:  name(cstr) tag(u8) value(tag-width | cstr)
//! Vector:  name(cstr) tag(u8) ndims(i32) dims(i32 x ndims) payload
//! ```
//!
//! Vector dimensions are emitted from the fastest-varying (innermost) axis
//! to the slowest; the payload stays row-major for the declared shape.
//! `totalSize` counts the scalar and vector sections plus the 16 header
//! bytes.

use dmap_buffers::Writer;

use crate::constants::{FILE_DATACODE, HEADER_LEN};
use crate::error::DmapError;
use crate::record::Record;
use crate::value::{ArrayData, DmapArray, DmapScalar};

/// Serializes a [`Record`] into the dmap wire layout.
///
/// The full byte sequence is assembled in memory before being returned, so
/// a failed encode produces no partial output.
pub struct DmapEncoder {
    writer: Writer,
    magic: i32,
}

impl Default for DmapEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DmapEncoder {
    /// Creates an encoder framing records with [`FILE_DATACODE`].
    pub fn new() -> Self {
        Self::with_magic(FILE_DATACODE)
    }

    /// Creates an encoder framing records with the given magic code.
    ///
    /// See [`crate::constants::STREAM_DATACODE`] for why the marker is a
    /// parameter rather than a constant.
    pub fn with_magic(magic: i32) -> Self {
        Self {
            writer: Writer::new(),
            magic,
        }
    }

    /// Encodes a record and returns the complete framed byte sequence.
    pub fn encode(&mut self, record: &Record) -> Result<Vec<u8>, DmapError> {
        let mut section_len = 0usize;
        for (name, value) in record.scalars() {
            check_name(name)?;
            if let DmapScalar::Str(s) = value {
                check_text(name, s)?;
            }
            section_len += name.len() + 2 + value.encoded_len();
        }
        for (name, value) in record.vectors() {
            check_name(name)?;
            section_len += name.len() + 2 + value.encoded_len();
        }

        self.writer.reset();
        self.writer.i32(self.magic);
        self.writer.i32((section_len + HEADER_LEN) as i32);
        self.writer.i32(record.scalar_count() as i32);
        self.writer.i32(record.vector_count() as i32);
        for (name, value) in record.scalars() {
            self.write_scalar(name, value);
        }
        for (name, value) in record.vectors() {
            self.write_vector(name, value);
        }
        Ok(self.writer.flush())
    }

    fn write_scalar(&mut self, name: &str, value: &DmapScalar) {
        self.writer.cstr(name);
        self.writer.u8(value.wire_type().code());
        match value {
            DmapScalar::Char(v) => self.writer.u8(*v),
            DmapScalar::Short(v) => self.writer.i16(*v),
            DmapScalar::Int(v) => self.writer.i32(*v),
            DmapScalar::Float(v) => self.writer.f32(*v),
            DmapScalar::Str(s) => self.writer.cstr(s),
        }
    }

    fn write_vector(&mut self, name: &str, value: &DmapArray) {
        self.writer.cstr(name);
        self.writer.u8(value.wire_type().code());
        self.writer.i32(value.shape().len() as i32);
        for dim in value.shape().iter().rev() {
            self.writer.i32(*dim as i32);
        }
        match value.data() {
            ArrayData::Char(v) => self.writer.buf(v),
            ArrayData::Short(v) => {
                for e in v {
                    self.writer.i16(*e);
                }
            }
            ArrayData::Int(v) => {
                for e in v {
                    self.writer.i32(*e);
                }
            }
            ArrayData::Float(v) => {
                for e in v {
                    self.writer.f32(*e);
                }
            }
        }
    }
}

fn check_name(name: &str) -> Result<(), DmapError> {
    if !name.is_ascii() || name.as_bytes().contains(&0) {
        return Err(DmapError::EncodeError(format!(
            "field name {name:?} is not plain ASCII"
        )));
    }
    Ok(())
}

fn check_text(name: &str, s: &str) -> Result<(), DmapError> {
    if s.as_bytes().contains(&0) {
        return Err(DmapError::EncodeError(format!(
            "text value of `{name}` contains an embedded terminator"
        )));
    }
    Ok(())
}
