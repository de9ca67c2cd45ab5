//! Writer/StreamReader roundtrip matrix for the buffers crate.

use dmap_buffers::{BufferError, StreamReader, Writer};

// ---------------------------------------------------------------------------
// Writer/StreamReader roundtrip matrix
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_u8() {
    let mut w = Writer::new();
    w.u8(0x00);
    w.u8(0x7F);
    w.u8(0xFF);
    let data = w.flush();
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.u8().unwrap(), 0x00);
    assert_eq!(r.u8().unwrap(), 0x7F);
    assert_eq!(r.u8().unwrap(), 0xFF);
}

#[test]
fn roundtrip_i16() {
    let mut w = Writer::new();
    w.i16(i16::MIN);
    w.i16(-1000);
    w.i16(0);
    w.i16(i16::MAX);
    let data = w.flush();
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.i16().unwrap(), i16::MIN);
    assert_eq!(r.i16().unwrap(), -1000);
    assert_eq!(r.i16().unwrap(), 0);
    assert_eq!(r.i16().unwrap(), i16::MAX);
}

#[test]
fn roundtrip_i32() {
    let mut w = Writer::new();
    w.i32(i32::MIN);
    w.i32(-1);
    w.i32(0);
    w.i32(65537);
    w.i32(i32::MAX);
    let data = w.flush();
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.i32().unwrap(), i32::MIN);
    assert_eq!(r.i32().unwrap(), -1);
    assert_eq!(r.i32().unwrap(), 0);
    assert_eq!(r.i32().unwrap(), 65537);
    assert_eq!(r.i32().unwrap(), i32::MAX);
}

#[test]
fn roundtrip_i64() {
    let mut w = Writer::new();
    w.i64(i64::MIN);
    w.i64(-1);
    w.i64(i64::MAX);
    let data = w.flush();
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.i64().unwrap(), i64::MIN);
    assert_eq!(r.i64().unwrap(), -1);
    assert_eq!(r.i64().unwrap(), i64::MAX);
}

#[test]
fn roundtrip_f32_f64() {
    let mut w = Writer::new();
    w.f32(0.0);
    w.f32(-1.5);
    w.f32(f32::MAX);
    w.f64(1.0e300);
    let data = w.flush();
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.f32().unwrap(), 0.0);
    assert_eq!(r.f32().unwrap(), -1.5);
    assert_eq!(r.f32().unwrap(), f32::MAX);
    assert_eq!(r.f64().unwrap(), 1.0e300);
}

#[test]
fn little_endian_layout() {
    let mut w = Writer::new();
    w.u16(0x0102);
    w.i32(0x0304_0506);
    assert_eq!(w.flush(), vec![0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
}

// ---------------------------------------------------------------------------
// Zero-terminated strings
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_cstr() {
    let mut w = Writer::new();
    w.cstr("noise.search");
    w.cstr("");
    w.cstr("combf");
    let data = w.flush();
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.cstr().unwrap(), "noise.search");
    assert_eq!(r.cstr().unwrap(), "");
    assert_eq!(r.cstr().unwrap(), "combf");
}

#[test]
fn empty_cstr_is_single_byte() {
    let mut w = Writer::new();
    w.cstr("");
    assert_eq!(w.flush(), vec![0]);
}

#[test]
fn cstr_invalid_utf8() {
    let data = [0xFF, 0xFE, 0x00];
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.cstr(), Err(BufferError::InvalidUtf8));
}

// ---------------------------------------------------------------------------
// End of stream
// ---------------------------------------------------------------------------

#[test]
fn short_read_is_error_not_panic() {
    let data = [0x01, 0x02];
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.i32(), Err(BufferError::EndOfStream));
}

#[test]
fn unterminated_cstr_is_end_of_stream() {
    let data = *b"nrang";
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.cstr(), Err(BufferError::EndOfStream));
}

#[test]
fn u8_or_eof_distinguishes_clean_eof() {
    let data = [0xAB];
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.u8_or_eof().unwrap(), Some(0xAB));
    assert_eq!(r.u8_or_eof().unwrap(), None);
}

#[test]
fn exact_reads_requested_length() {
    let data = [1u8, 2, 3, 4, 5];
    let mut r = StreamReader::new(&data[..]);
    assert_eq!(r.exact(3).unwrap(), vec![1, 2, 3]);
    assert_eq!(r.exact(3), Err(BufferError::EndOfStream));
}
