//! Framing constants for the dmap wire format.

/// Record code written in the header of dmap files by the reference writer.
pub const FILE_DATACODE: i32 = 33;

/// Record code observed on live instrument streams.
///
/// Historical writers and the live feed disagree on the framing marker:
/// files carry [`FILE_DATACODE`] while sockets carry this value. Neither
/// side can be changed without breaking the other, so the codec takes the
/// magic as a parameter ([`crate::DmapEncoder::with_magic`],
/// [`crate::DmapDecoder::with_magic`]) and the integrator picks the one
/// matching the peer. Both default to [`FILE_DATACODE`].
pub const STREAM_DATACODE: i32 = 65537;

/// Byte length of the record header: magic, total size, scalar count,
/// vector count, each a 4-byte little-endian signed integer.
pub const HEADER_LEN: usize = 16;
