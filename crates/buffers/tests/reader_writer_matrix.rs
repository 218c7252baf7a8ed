//! Writer/Reader matrix for the buffers crate.

use model_pack_buffers::{BufferError, Reader, Writer};

// ---------------------------------------------------------------------------
// Integer roundtrips
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_unsigned() {
    let mut w = Writer::new();
    w.u8(0xFF);
    w.u16(0x0102);
    w.u32(u32::MAX);
    w.u64(0x0102_0304_0506_0708);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u8().unwrap(), 0xFF);
    assert_eq!(r.u16().unwrap(), 0x0102);
    assert_eq!(r.u32().unwrap(), u32::MAX);
    assert_eq!(r.u64().unwrap(), 0x0102_0304_0506_0708);
    assert!(r.is_eof());
}

#[test]
fn roundtrip_signed() {
    let mut w = Writer::new();
    for v in [i32::MIN, -1, 0, 1, i32::MAX] {
        w.i32(v);
    }
    for v in [i64::MIN, -1, 0, i64::MAX] {
        w.i64(v);
    }
    w.i8(-128);
    let data = w.flush();
    let mut r = Reader::new(&data);
    for v in [i32::MIN, -1, 0, 1, i32::MAX] {
        assert_eq!(r.i32().unwrap(), v);
    }
    for v in [i64::MIN, -1, 0, i64::MAX] {
        assert_eq!(r.i64().unwrap(), v);
    }
    assert_eq!(r.i8().unwrap(), -128);
}

#[test]
fn integers_are_big_endian() {
    let mut w = Writer::new();
    w.i32(3);
    w.i64(-2);
    assert_eq!(
        w.flush(),
        [0, 0, 0, 3, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]
    );
}

// ---------------------------------------------------------------------------
// Strings and raw bytes
// ---------------------------------------------------------------------------

#[test]
fn utf8_reports_byte_length() {
    let mut w = Writer::new();
    assert_eq!(w.utf8("h\u{e9}llo"), 6);
    assert_eq!(w.utf8("\u{1F600}"), 4);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.utf8(6).unwrap(), "h\u{e9}llo");
    assert_eq!(r.utf8(4).unwrap(), "\u{1F600}");
}

#[test]
fn invalid_utf8_leaves_cursor() {
    let data = [0xC3, 0x28];
    let mut r = Reader::new(&data);
    assert_eq!(r.utf8(2), Err(BufferError::InvalidUtf8));
    assert_eq!(r.x, 0);
    assert_eq!(r.buf(2).unwrap(), &data);
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[test]
fn reads_past_end_fail_without_advancing() {
    let data = [1, 2, 3];
    let mut r = Reader::new(&data);
    assert_eq!(r.i32(), Err(BufferError::EndOfBuffer));
    assert_eq!(r.size(), 3);
    assert_eq!(r.skip(4), Err(BufferError::EndOfBuffer));
    r.skip(2).unwrap();
    assert_eq!(r.peek().unwrap(), 3);
    assert_eq!(r.u8().unwrap(), 3);
    assert_eq!(r.peek(), Err(BufferError::EndOfBuffer));
}

#[test]
fn from_slice_limits_the_window() {
    let data = [9, 1, 2, 9];
    let mut r = Reader::from_slice(&data, 1, 3);
    assert_eq!(r.u16().unwrap(), 0x0102);
    assert!(r.is_eof());
    assert!(r.u8().is_err());
}

// ---------------------------------------------------------------------------
// Writer growth and flushing
// ---------------------------------------------------------------------------

#[test]
fn grows_past_initial_allocation() {
    let mut w = Writer::with_alloc_size(2);
    let payload: Vec<u8> = (0..=255).collect();
    w.buf(&payload);
    w.u8(7);
    assert_eq!(w.len(), 257);
    let out = w.flush();
    assert_eq!(&out[..256], payload.as_slice());
    assert_eq!(out[256], 7);
}

#[test]
fn flush_splits_payloads() {
    let mut w = Writer::new();
    w.u8(1);
    assert_eq!(w.pending(), [1]);
    assert_eq!(w.flush(), [1]);
    assert!(w.is_empty());
    w.u16(0x0203);
    assert_eq!(w.flush(), [2, 3]);
    w.u8(4);
    w.reset();
    assert!(w.flush().is_empty());
}

#[test]
fn error_display() {
    assert_eq!(BufferError::EndOfBuffer.to_string(), "end of buffer");
    assert_eq!(BufferError::Overflow.to_string(), "buffer overflow");
}
