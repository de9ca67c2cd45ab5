//! Wire-level encode/decode matrix: byte layout, round trips, framing
//! resynchronization, and failure modes.

use dmap::constants::{FILE_DATACODE, STREAM_DATACODE};
use dmap::{
    fitacf_record, rawacf_record, standard_45km_rawacf, ArrayData, DmapArray, DmapDecoder,
    DmapEncoder, DmapError, DmapScalar, RecordBuilder, WireType,
};

fn encode(record: &dmap::Record) -> Vec<u8> {
    DmapEncoder::new().encode(record).unwrap()
}

fn decode(bytes: &[u8]) -> dmap::DecodedRecord {
    DmapDecoder::new().read_record(bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Byte-exact layout
// ---------------------------------------------------------------------------

#[test]
fn exact_wire_bytes_for_small_record() {
    let mut record = RecordBuilder::new()
        .scalar("stid", DmapScalar::Short(7))
        .build();
    record
        .add_vector_blank("pwr0", &DmapScalar::Float(1.5), &[2])
        .unwrap();
    let bytes = encode(&record);

    let mut expected = Vec::new();
    expected.extend_from_slice(&33i32.to_le_bytes());
    expected.extend_from_slice(&46i32.to_le_bytes()); // 16 + 8 + 22
    expected.extend_from_slice(&1i32.to_le_bytes());
    expected.extend_from_slice(&1i32.to_le_bytes());
    expected.extend_from_slice(b"stid\0");
    expected.push(2); // short
    expected.extend_from_slice(&7i16.to_le_bytes());
    expected.extend_from_slice(b"pwr0\0");
    expected.push(4); // float
    expected.extend_from_slice(&1i32.to_le_bytes());
    expected.extend_from_slice(&2i32.to_le_bytes());
    expected.extend_from_slice(&1.5f32.to_le_bytes());
    expected.extend_from_slice(&1.5f32.to_le_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn header_total_size_counts_everything() {
    let record = standard_45km_rawacf().unwrap();
    let bytes = encode(&record);
    let total = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
    assert_eq!(total as usize, bytes.len());
    let snum = i32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let anum = i32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!(snum as usize, record.scalar_count());
    assert_eq!(anum as usize, record.vector_count());
}

#[test]
fn dimension_list_is_reversed_on_the_wire() {
    // One vector, no scalars: dims start right after the name and tag.
    let record = RecordBuilder::new()
        .vector_blank("acfd", &DmapScalar::Short(0), &[4, 3, 2])
        .unwrap()
        .build();
    let bytes = encode(&record);
    let dims_at = 16 + "acfd".len() + 1 + 1;
    let ndims = i32::from_le_bytes(bytes[dims_at..dims_at + 4].try_into().unwrap());
    assert_eq!(ndims, 3);
    let dims: Vec<i32> = (0..3)
        .map(|i| {
            let at = dims_at + 4 + 4 * i;
            i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
        })
        .collect();
    assert_eq!(dims, [2, 3, 4]); // innermost axis first

    let decoded = decode(&bytes);
    assert_eq!(decoded.vector("acfd").unwrap().shape(), &[4, 3, 2]);
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn rawacf_roundtrip_preserves_every_field() {
    let record = standard_45km_rawacf().unwrap();
    let decoded = decode(&encode(&record));

    assert_eq!(decoded.scalars.len(), record.scalar_count());
    assert_eq!(decoded.vectors.len(), record.vector_count());
    for (name, value) in record.scalars() {
        assert_eq!(decoded.scalar(name), Some(value), "scalar {name}");
    }
    for (name, value) in record.vectors() {
        assert_eq!(decoded.vector(name), Some(value), "vector {name}");
    }
}

#[test]
fn fitacf_roundtrip_preserves_every_field() {
    let record = fitacf_record(
        &[
            ("nrang", DmapScalar::Short(10)),
            ("noise.sky", DmapScalar::Float(2.5)),
        ],
        &[("v", DmapArray::new(vec![10], ArrayData::Float((0..10).map(|i| i as f32).collect())).unwrap())],
    )
    .unwrap();
    let decoded = decode(&encode(&record));
    for (name, value) in record.vectors() {
        assert_eq!(decoded.vector(name), Some(value), "vector {name}");
    }
    assert_eq!(decoded.scalar("noise.sky"), Some(&DmapScalar::Float(2.5)));
}

#[test]
fn declaration_order_survives_the_wire() {
    let record = standard_45km_rawacf().unwrap();
    let decoded = decode(&encode(&record));
    let sent: Vec<&str> = record.scalars().map(|(n, _)| n).collect();
    let got: Vec<&str> = decoded.scalars.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(sent, got);
}

#[test]
fn empty_comment_roundtrips_as_empty_string() {
    let record = rawacf_record(&[("combf", DmapScalar::Str(String::new()))], &[]).unwrap();
    let decoded = decode(&encode(&record));
    assert_eq!(decoded.scalar("combf"), Some(&DmapScalar::Str(String::new())));
}

#[test]
fn gate_zero_override_scenario() {
    // nrang=4, mplgs=3 (defaults): acfd is [4, 3, 2]. Set gate 0's
    // correlation samples to a constant and leave gates 1-3 at the fill.
    let mut acfd = vec![0i16; 4 * 3 * 2];
    for e in acfd.iter_mut().take(3 * 2) {
        *e = 7;
    }
    let record = rawacf_record(
        &[],
        &[("acfd", DmapArray::new(vec![4, 3, 2], ArrayData::Short(acfd)).unwrap())],
    )
    .unwrap();
    let decoded = decode(&encode(&record));
    match decoded.vector("acfd").unwrap().data() {
        ArrayData::Short(v) => {
            assert!(v[..6].iter().all(|&e| e == 7));
            assert!(v[6..].iter().all(|&e| e == 0));
        }
        other => panic!("unexpected acfd storage {other:?}"),
    }
}

#[test]
fn timestamp_roundtrip() {
    let mut record = standard_45km_rawacf().unwrap();
    let t = chrono::NaiveDate::from_ymd_opt(2015, 1, 1)
        .unwrap()
        .and_hms_micro_opt(23, 59, 58, 123_456)
        .unwrap();
    record.set_timestamp(t).unwrap();
    let decoded = decode(&encode(&record));
    assert_eq!(decoded.scalar("time.yr"), Some(&DmapScalar::Short(2015)));
    assert_eq!(decoded.scalar("time.mo"), Some(&DmapScalar::Short(1)));
    assert_eq!(decoded.scalar("time.dy"), Some(&DmapScalar::Short(1)));
    assert_eq!(decoded.scalar("time.hr"), Some(&DmapScalar::Short(23)));
    assert_eq!(decoded.scalar("time.mt"), Some(&DmapScalar::Short(59)));
    assert_eq!(decoded.scalar("time.sc"), Some(&DmapScalar::Short(58)));
    assert_eq!(decoded.scalar("time.us"), Some(&DmapScalar::Int(123_456)));
}

// ---------------------------------------------------------------------------
// Resynchronization
// ---------------------------------------------------------------------------

fn garbage(n: usize) -> Vec<u8> {
    // Nonzero bytes: the file magic's LE encoding contains three zero
    // bytes, so nonzero garbage can never alias a marker, even across the
    // garbage/record boundary.
    (0..n).map(|i| (i % 251 + 1) as u8).collect()
}

#[test]
fn resync_skips_arbitrary_garbage_prefixes() {
    let record = standard_45km_rawacf().unwrap();
    let bytes = encode(&record);
    let clean = decode(&bytes);
    for n in [0usize, 1, 2, 3, 4, 5, 7, 37, 255] {
        let mut stream = garbage(n);
        stream.extend_from_slice(&bytes);
        let decoded = decode(&stream);
        assert_eq!(decoded, clean, "garbage prefix of {n} bytes");
    }
}

#[test]
fn resync_limit_is_enforced() {
    let record = standard_45km_rawacf().unwrap();
    let bytes = encode(&record);
    let mut stream = garbage(100);
    stream.extend_from_slice(&bytes);

    let bounded = DmapDecoder::new().with_resync_limit(Some(50));
    let err = bounded.read_record(&stream[..]).unwrap_err();
    assert!(matches!(err, DmapError::ResyncExhausted(50)));

    let generous = DmapDecoder::new().with_resync_limit(Some(200));
    assert!(generous.read_record(&stream[..]).is_ok());
}

#[test]
fn iter_records_drains_a_noisy_stream() {
    let first = standard_45km_rawacf().unwrap();
    let second = rawacf_record(&[("stid", DmapScalar::Short(9))], &[]).unwrap();
    let mut encoder = DmapEncoder::new();

    let mut stream = garbage(13);
    stream.extend_from_slice(&encoder.encode(&first).unwrap());
    stream.extend(garbage(5));
    stream.extend_from_slice(&encoder.encode(&second).unwrap());

    let decoder = DmapDecoder::new();
    let records: Vec<_> = decoder
        .iter_records(&stream[..])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].scalar("stid"), Some(&DmapScalar::Short(9)));
}

#[test]
fn mismatched_magic_never_syncs() {
    let bytes = DmapEncoder::with_magic(STREAM_DATACODE)
        .encode(&standard_45km_rawacf().unwrap())
        .unwrap();
    // A file-code decoder scans the whole stream without finding a marker.
    let err = DmapDecoder::with_magic(FILE_DATACODE)
        .read_record(&bytes[..])
        .unwrap_err();
    assert!(matches!(err, DmapError::TruncatedStream));
    // Matching the live-stream code decodes normally.
    assert!(DmapDecoder::with_magic(STREAM_DATACODE)
        .read_record(&bytes[..])
        .is_ok());
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

/// Header plus one scalar field with an arbitrary tag byte and payload.
fn single_scalar_stream(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&33i32.to_le_bytes());
    let total = 16 + "x\0".len() + 1 + payload.len();
    bytes.extend_from_slice(&(total as i32).to_le_bytes());
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());
    bytes.extend_from_slice(b"x\0");
    bytes.push(tag);
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn reserved_tag_fails_not_misdecodes() {
    let stream = single_scalar_stream(8, &1.0f64.to_le_bytes());
    let err = DmapDecoder::new().read_record(&stream[..]).unwrap_err();
    assert!(matches!(err, DmapError::UnsupportedType(WireType::Double)));
}

#[test]
fn unknown_tag_fails() {
    let stream = single_scalar_stream(200, &[0; 4]);
    let err = DmapDecoder::new().read_record(&stream[..]).unwrap_err();
    assert!(matches!(err, DmapError::UnknownType(200)));
}

#[test]
fn truncated_record_fails() {
    let bytes = encode(&standard_45km_rawacf().unwrap());
    for cut in [bytes.len() - 3, bytes.len() / 2, 17] {
        let err = DmapDecoder::new().read_record(&bytes[..cut]).unwrap_err();
        assert!(matches!(err, DmapError::TruncatedStream), "cut at {cut}");
    }
}

#[test]
fn negative_field_count_is_malformed() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&33i32.to_le_bytes());
    bytes.extend_from_slice(&16i32.to_le_bytes());
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());
    let err = DmapDecoder::new().read_record(&bytes[..]).unwrap_err();
    assert!(matches!(err, DmapError::Malformed(_)));
}

#[test]
fn embedded_terminator_in_text_aborts_encode() {
    let record = rawacf_record(&[("combf", DmapScalar::Str("bad\0comment".into()))], &[]).unwrap();
    let err = DmapEncoder::new().encode(&record).unwrap_err();
    assert!(matches!(err, DmapError::EncodeError(_)));
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[test]
fn projection_of_decoded_record_matches_shapes() {
    let record = rawacf_record(&[("nrang", DmapScalar::Short(2))], &[]).unwrap();
    let decoded = decode(&encode(&record));
    let tree = dmap::project(&decoded);
    assert_eq!(tree["nrang"], serde_json::json!(2));
    let acfd = tree["acfd"].as_array().unwrap();
    assert_eq!(acfd.len(), 2); // gates
    assert_eq!(acfd[0].as_array().unwrap().len(), 3); // lags
    assert_eq!(acfd[0][0].as_array().unwrap().len(), 2); // re/im
}
