//! Binary codec matrix: wire layout, roundtrips and failure modes.

mod common;

use common::{monitor, Action, Monitor, Pair, Schedule, Throttle, Trigger, WithFloat, Wrapper};
use model_pack::binary::{self, BinaryDecoder, BinaryEncoder, BinaryOptions};
use model_pack::{
    CalendarUnit, DurationUnit, DurationValue, ModelCodec, ModelError, ModelRef, Reader, Record,
    StreamReader, StreamWriter, Value, Writer,
};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn pair_scenario() {
    let pair = Pair {
        a: 3,
        b: Some("x".into()),
    };
    let bytes = binary::to_bytes(&pair).unwrap();
    assert_eq!(bytes, [1, 0, 0, 0, 3, 1, 1, b'x']);
    let back: Pair = binary::from_bytes(&bytes).unwrap();
    assert_eq!(back.a, 3);
    assert_eq!(back.b.as_deref(), Some("x"));
}

#[test]
fn throttle_layout() {
    let bytes = binary::to_bytes(&Throttle {
        value: 2,
        period: Some(DurationValue::new(-3, DurationUnit::Hours)),
    })
    .unwrap();
    // period: flag, zig-zag -3 = 5, unit ordinal; value: flag, 8-byte long
    assert_eq!(bytes, [1, 5, 5, 1, 0, 0, 0, 0, 0, 0, 0, 2]);
}

#[test]
fn schedule_layout() {
    let bytes = binary::to_bytes(&Schedule {
        interval: 1,
        unit: Some(CalendarUnit::Forever),
        timezone: None,
        cron: None,
    })
    .unwrap();
    // canonical order: cron, interval, timezone, unit
    assert_eq!(bytes, [0, 1, 0, 0, 0, 1, 0, 1, 15]);
}

#[test]
fn model_list_uses_four_byte_count() {
    let bytes = binary::to_bytes(&Trigger {
        id: String::new(),
        severity: String::new(),
        condition: None,
        actions: Vec::new(),
    })
    .unwrap();
    // actions, condition, id, severity
    assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 1, 0, 1, 0]);
}

// ---------------------------------------------------------------------------
// Roundtrips
// ---------------------------------------------------------------------------

#[test]
fn monitor_roundtrip() {
    let m = monitor();
    let bytes = binary::to_bytes(&m).unwrap();
    let back: Monitor = binary::from_bytes(&bytes).unwrap();
    assert_eq!(back, m);
    assert_eq!(back.triggers[0].actions[0].throttle, m.triggers[0].actions[0].throttle);
}

#[test]
fn unexposed_fields_are_not_encoded() {
    let mut m = monitor();
    let before = binary::to_bytes(&m).unwrap();
    m.revision = 99;
    assert_eq!(binary::to_bytes(&m).unwrap(), before);
    let back: Monitor = binary::from_bytes(&before).unwrap();
    assert_eq!(back.revision, 0);
}

#[test]
fn absent_fields_stay_default() {
    let action = Action {
        name: "n".into(),
        ..Action::default()
    };
    let back: Action = binary::from_bytes(&binary::to_bytes(&action).unwrap()).unwrap();
    assert_eq!(back.throttle, None);
    assert_eq!(back.subject, None);
    assert_eq!(back, action);
}

#[test]
fn encoder_is_reusable() {
    let mut enc = BinaryEncoder::new();
    let first = enc.encode(&Pair { a: 1, b: None }).unwrap();
    let second = enc.encode(&Pair { a: 1, b: None }).unwrap();
    assert_eq!(first, second);
}

#[test]
fn codec_streams_several_models() {
    let codec = ModelCodec::<Schedule>::new().unwrap();
    let mut writer = Writer::new();
    let schedules = [common::schedule(), Schedule::default()];
    for s in &schedules {
        codec.write(&mut writer, s).unwrap();
    }
    let bytes = writer.flush();
    let mut reader = Reader::new(&bytes);
    for s in &schedules {
        assert_eq!(&codec.read(&mut reader).unwrap(), s);
    }
    assert!(reader.is_eof());
}

#[test]
fn records_roundtrip_without_the_typed_model() {
    let record = Record::capture(&monitor());
    let mut enc = BinaryEncoder::new();
    enc.write_record(&record).unwrap();
    let bytes = enc.writer.flush();
    let mut reader = Reader::new(&bytes);
    let back = BinaryDecoder::new()
        .read_record(&mut reader, ModelRef::of::<Monitor>())
        .unwrap();
    assert_eq!(back, record);
    assert_eq!(back.get("enabled"), Some(&Value::Bool(true)));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unsupported_fields_fail_for_every_entry_point() {
    let w = WithFloat::default();
    assert!(matches!(
        binary::to_bytes(&w),
        Err(ModelError::UnsupportedField { model: "WithFloat", field: "score", .. })
    ));
    assert!(matches!(
        binary::from_bytes::<WithFloat>(&[0, 0]),
        Err(ModelError::UnsupportedField { .. })
    ));
    assert!(ModelCodec::<WithFloat>::new().is_err());
    // reached only through a nested model
    assert!(matches!(
        ModelCodec::<Wrapper>::new(),
        Err(ModelError::UnsupportedField { model: "WithFloat", .. })
    ));
}

#[test]
fn record_tag_mismatch_is_reported() {
    let record = Record::new(
        ModelRef::of::<Pair>(),
        vec![("a", Some(Value::Str("3".into()))), ("b", None)],
    );
    assert!(matches!(
        BinaryEncoder::new().write_record(&record),
        Err(ModelError::TypeMismatch { field: "a", found: "string", .. })
    ));
}

#[test]
fn unknown_unit_ordinals_are_rejected() {
    // period present, magnitude 0, unit ordinal 7 (out of range)
    let bytes = [1, 0, 7, 1, 0, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(
        binary::from_bytes::<Throttle>(&bytes),
        Err(ModelError::InvalidValue { field: "period", .. })
    ));
    let bytes = [0, 1, 0, 0, 0, 1, 0, 1, 16];
    assert!(matches!(
        binary::from_bytes::<Schedule>(&bytes),
        Err(ModelError::InvalidValue { field: "unit", .. })
    ));
}

#[test]
fn negative_list_length_is_rejected() {
    let bytes = [1, 0xff, 0xff, 0xff, 0xff];
    assert!(matches!(
        binary::from_bytes::<Trigger>(&bytes),
        Err(ModelError::InvalidValue { field: "actions", .. })
    ));
}

#[test]
fn depth_limit() {
    let decoder = BinaryDecoder::with_options(BinaryOptions {
        max_depth: 1,
        ..BinaryOptions::default()
    });
    let bytes = binary::to_bytes(&monitor()).unwrap();
    // Monitor -> Trigger -> Action -> Throttle is four levels deep
    assert!(matches!(
        decoder.decode::<Monitor>(&bytes),
        Err(ModelError::DepthExceeded { limit: 1, .. })
    ));
}

#[test]
fn every_truncation_fails() {
    let bytes = binary::to_bytes(&monitor()).unwrap();
    for len in 0..bytes.len() {
        assert!(
            binary::from_bytes::<Monitor>(&bytes[..len]).is_err(),
            "prefix of {len} bytes decoded"
        );
    }
}
