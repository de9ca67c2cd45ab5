//! Resynchronizing dmap stream decoder.
//!
//! The decoder consumes any byte-oriented [`Read`] source (file or live
//! socket). Records carry no delimiter other than the framing magic, so
//! decoding starts by scanning byte-at-a-time for the marker, discarding
//! anything in front of it. A stream that begins mid-record or carries
//! framing noise therefore still yields every subsequent record.
//!
//! The scan is unbounded by default, matching the historical reader; a
//! caller that must not block forever can either bound it with
//! [`DmapDecoder::with_resync_limit`] or put a read deadline on the
//! underlying stream.

use std::io::Read;

use dmap_buffers::StreamReader;

use crate::constants::FILE_DATACODE;
use crate::error::DmapError;
use crate::value::{ArrayData, DmapArray, DmapScalar, DmapValue, WireType};

/// The scalar and vector mappings decoded from one record.
///
/// Unlike [`crate::Record`], a decoded record carries no schema: fields
/// appear exactly as the wire declared them, in wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedRecord {
    pub scalars: Vec<(String, DmapScalar)>,
    pub vectors: Vec<(String, DmapArray)>,
}

impl DecodedRecord {
    /// Looks up a decoded scalar by name.
    pub fn scalar(&self, name: &str) -> Option<&DmapScalar> {
        self.scalars.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Looks up a decoded vector by name.
    pub fn vector(&self, name: &str) -> Option<&DmapArray> {
        self.vectors.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// Looks up a decoded field of either kind.
    pub fn get(&self, name: &str) -> Option<DmapValue> {
        if let Some(s) = self.scalar(name) {
            return Some(DmapValue::Scalar(s.clone()));
        }
        self.vector(name).map(|a| DmapValue::Array(a.clone()))
    }
}

/// Decodes framed dmap records from a byte stream.
///
/// Decoding is synchronous and blocking; the stream cursor is owned
/// exclusively by the caller. One call to [`DmapDecoder::read_record`]
/// consumes exactly one record (plus any garbage skipped in front of it);
/// call it in a loop, or use [`DmapDecoder::iter_records`], to drain a
/// multi-record stream.
pub struct DmapDecoder {
    magic: i32,
    resync_limit: Option<usize>,
}

impl Default for DmapDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DmapDecoder {
    /// Creates a decoder expecting records framed with [`FILE_DATACODE`].
    pub fn new() -> Self {
        Self::with_magic(FILE_DATACODE)
    }

    /// Creates a decoder expecting the given magic code.
    ///
    /// Live feeds frame with [`crate::constants::STREAM_DATACODE`]; see
    /// the constant's docs for the writer/reader discrepancy.
    pub fn with_magic(magic: i32) -> Self {
        Self {
            magic,
            resync_limit: None,
        }
    }

    /// Bounds the number of bytes the resynchronization scan may discard
    /// before a record; `None` restores the unbounded historical behavior.
    pub fn with_resync_limit(mut self, limit: Option<usize>) -> Self {
        self.resync_limit = limit;
        self
    }

    /// Reads one record from the stream, resynchronizing first.
    ///
    /// Fails with [`DmapError::TruncatedStream`] when the stream ends
    /// before the record does (including an empty stream).
    pub fn read_record<R: Read>(&self, source: R) -> Result<DecodedRecord, DmapError> {
        let mut reader = StreamReader::new(source);
        if self.resync(&mut reader)? {
            self.read_body(&mut reader)
        } else {
            Err(DmapError::TruncatedStream)
        }
    }

    /// Returns an iterator that yields records until the stream is
    /// exhausted. The iterator ends cleanly when end-of-stream is reached
    /// while scanning for the next marker; a stream ending inside a record
    /// yields a final `TruncatedStream` error.
    pub fn iter_records<R: Read>(&self, source: R) -> Records<'_, R> {
        Records {
            decoder: self,
            reader: StreamReader::new(source),
            done: false,
        }
    }

    /// Scans for the magic marker with a sliding 4-byte window, one byte
    /// at a time. Returns `false` on a clean end-of-stream.
    fn resync<R: Read>(&self, reader: &mut StreamReader<R>) -> Result<bool, DmapError> {
        let mut window = [0u8; 4];
        let mut filled = 0usize;
        let mut skipped = 0usize;
        loop {
            let byte = match reader.u8_or_eof()? {
                Some(b) => b,
                None => return Ok(false),
            };
            if filled < 4 {
                window[filled] = byte;
                filled += 1;
            } else {
                window.rotate_left(1);
                window[3] = byte;
                skipped += 1;
                if let Some(limit) = self.resync_limit {
                    if skipped > limit {
                        return Err(DmapError::ResyncExhausted(limit));
                    }
                }
            }
            if filled == 4 && i32::from_le_bytes(window) == self.magic {
                return Ok(true);
            }
        }
    }

    /// Parses header counts and both sections, the marker having already
    /// been consumed.
    fn read_body<R: Read>(&self, reader: &mut StreamReader<R>) -> Result<DecodedRecord, DmapError> {
        // Total size is recorded but not cross-checked against the counts;
        // a lying header surfaces as a truncated read or a later resync
        // failure, exactly as it did for the historical reader.
        let _total_size = reader.i32()?;
        let scalar_count = reader.i32()?;
        let vector_count = reader.i32()?;
        if scalar_count < 0 || vector_count < 0 {
            return Err(DmapError::Malformed("negative field count in header"));
        }

        let mut record = DecodedRecord::default();
        for _ in 0..scalar_count {
            let name = reader.cstr()?;
            let ty = WireType::from_code(reader.u8()?)?;
            let value = self.read_scalar(reader, ty)?;
            record.scalars.push((name, value));
        }
        for _ in 0..vector_count {
            let name = reader.cstr()?;
            let ty = WireType::from_code(reader.u8()?)?;
            let value = self.read_vector(reader, ty)?;
            record.vectors.push((name, value));
        }
        Ok(record)
    }

    fn read_scalar<R: Read>(
        &self,
        reader: &mut StreamReader<R>,
        ty: WireType,
    ) -> Result<DmapScalar, DmapError> {
        Ok(match ty {
            WireType::Char => DmapScalar::Char(reader.u8()?),
            WireType::Short => DmapScalar::Short(reader.i16()?),
            WireType::Int => DmapScalar::Int(reader.i32()?),
            WireType::Float => DmapScalar::Float(reader.f32()?),
            WireType::String => DmapScalar::Str(reader.cstr()?),
            reserved => return Err(DmapError::UnsupportedType(reserved)),
        })
    }

    fn read_vector<R: Read>(
        &self,
        reader: &mut StreamReader<R>,
        ty: WireType,
    ) -> Result<DmapArray, DmapError> {
        let ndims = reader.i32()?;
        if !(0..=64).contains(&ndims) {
            return Err(DmapError::Malformed("implausible dimension count"));
        }
        // Dimensions arrive innermost axis first; storage order is
        // outermost first.
        let mut shape = Vec::with_capacity(ndims as usize);
        let mut len = 1usize;
        for _ in 0..ndims {
            let dim = reader.i32()?;
            if dim < 0 {
                return Err(DmapError::Malformed("negative dimension size"));
            }
            len = len
                .checked_mul(dim as usize)
                .ok_or(DmapError::Malformed("dimension product overflow"))?;
            shape.insert(0, dim as usize);
        }

        let data = match ty {
            WireType::Char => ArrayData::Char(reader.exact(len)?),
            WireType::Short => {
                let mut v = Vec::with_capacity(len);
                for _ in 0..len {
                    v.push(reader.i16()?);
                }
                ArrayData::Short(v)
            }
            WireType::Int => {
                let mut v = Vec::with_capacity(len);
                for _ in 0..len {
                    v.push(reader.i32()?);
                }
                ArrayData::Int(v)
            }
            WireType::Float => {
                let mut v = Vec::with_capacity(len);
                for _ in 0..len {
                    v.push(reader.f32()?);
                }
                ArrayData::Float(v)
            }
            reserved => return Err(DmapError::UnsupportedType(reserved)),
        };
        DmapArray::new(shape, data)
    }
}

/// Iterator over the records of a multi-record stream.
///
/// See [`DmapDecoder::iter_records`].
pub struct Records<'a, R: Read> {
    decoder: &'a DmapDecoder,
    reader: StreamReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<DecodedRecord, DmapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.resync(&mut self.reader) {
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                let result = self.decoder.read_body(&mut self.reader);
                if result.is_err() {
                    self.done = true;
                }
                Some(result)
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
