// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Canonical JSON projection tests.
//!
//! Runs the full resolve, decode and project pipeline and checks the
//! rendered JSON, including a cross-check against `prost-reflect`'s own
//! JSON serializer.

mod common;

use std::collections::HashMap;

use common::*;
use prost::Message as _;
use prost_reflect::{DescriptorPool, DynamicMessage as ReflectMessage, MapKey as ReflectKey, Value as ReflectValue};
use prost_types::FileDescriptorSet;
use proto2json::{Converter, DecodeOptions, ErrorKind, JsonOptions};
use serde_json::json;

fn converter() -> Converter {
    Converter::new(index_of(vec![sample_file(), legacy_file()]))
}

fn to_json(name: &str, data: &[u8]) -> serde_json::Value {
    converter().convert(name, data).unwrap()
}

fn to_compact(converter: Converter, name: &str, data: &[u8]) -> String {
    converter
        .with_json_options(JsonOptions::default().with_multiline(false))
        .convert_to_string(name, data)
        .unwrap()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_int64_max_is_a_json_string() {
    let data = Wire::new().varint(2, i64::MAX as u64).finish();
    let json = to_json("pkg.Sample", &data);
    assert_eq!(json, json!({"big": "9223372036854775807"}));
    assert!(json["big"].is_string());
}

#[test]
fn test_scalar_renderings() {
    let data = Wire::new()
        .varint(1, (-5i64) as u64)
        .varint(3, u32::MAX as u64)
        .varint(4, u64::MAX)
        .sint(5, -3)
        .sint(6, -4)
        .fixed32(7, 42)
        .fixed64(8, 43)
        .fixed32(9, (-44i32) as u32)
        .fixed64(10, (-45i64) as u64)
        .varint(11, 1)
        .string(12, "héllo \"quoted\"")
        .bytes(13, &[0, 1, 2, 0xFF])
        .fixed64(14, 2.5f64.to_bits())
        .fixed32(15, 0.1f32.to_bits())
        .varint(16, 2)
        .finish();

    assert_eq!(
        to_json("pkg.Sample", &data),
        json!({
            "count": -5,
            "small": 4294967295u32,
            "huge": "18446744073709551615",
            "delta": -3,
            "offset": "-4",
            "f32": 42,
            "f64": "43",
            "sf32": -44,
            "sf64": "-45",
            "flag": true,
            "label": "héllo \"quoted\"",
            "payload": "AAEC/w==",
            "ratio": 2.5,
            "scale": 0.1,
            "color": "GREEN"
        })
    );
}

#[test]
fn test_non_finite_and_integral_floats() {
    let data = Wire::new()
        .fixed64(14, f64::NAN.to_bits())
        .fixed32(15, f32::NEG_INFINITY.to_bits())
        .finish();
    assert_eq!(
        to_json("pkg.Sample", &data),
        json!({"ratio": "NaN", "scale": "-Infinity"})
    );

    let data = Wire::new().fixed64(14, 3.0f64.to_bits()).finish();
    assert_eq!(to_compact(converter(), "pkg.Sample", &data), r#"{"ratio":3}"#);

    let data = Wire::new().fixed64(14, (-0.0f64).to_bits()).finish();
    assert_eq!(to_compact(converter(), "pkg.Sample", &data), r#"{"ratio":-0}"#);
}

#[test]
fn test_unknown_enum_number_renders_as_number() {
    let data = Wire::new().varint(16, 7).finish();
    assert_eq!(to_json("pkg.Sample", &data), json!({"color": 7}));

    let data = Wire::new().varint(16, (-1i64) as u64).finish();
    assert_eq!(to_json("pkg.Sample", &data), json!({"color": -1}));
}

#[test]
fn test_enum_numbers_option() {
    let data = Wire::new().varint(16, 1).finish();
    let json = converter()
        .with_json_options(JsonOptions::default().with_enum_numbers(true))
        .convert("pkg.Sample", &data)
        .unwrap();
    assert_eq!(json, json!({"color": 1}));
}

// ============================================================================
// Presence
// ============================================================================

#[test]
fn test_absent_and_present_booleans() {
    // Implicit presence: false on the wire is indistinguishable from absent
    assert_eq!(to_json("pkg.Sample", &Wire::new().varint(11, 0).finish()), json!({}));

    // proto3 optional keeps an explicit false
    assert_eq!(
        to_json("pkg.Sample", &Wire::new().varint(17, 0).finish()),
        json!({"maybe": false})
    );
    assert_eq!(to_json("pkg.Sample", &[]), json!({}));

    // proto2 singular fields keep an explicit false
    assert_eq!(
        to_json("legacy.Record", &Wire::new().varint(1, 0).finish()),
        json!({"enabled": false})
    );
    assert_eq!(to_json("legacy.Record", &[]), json!({}));
}

#[test]
fn test_oneof_member_rendered_once() {
    let data = Wire::new().varint(23, 9).string(22, "last").finish();
    assert_eq!(to_json("pkg.Sample", &data), json!({"name": "last"}));
}

// ============================================================================
// Composite Fields
// ============================================================================

#[test]
fn test_map_first_seen_order_last_value_wins() {
    let data = Wire::new()
        .message(19, string_int_entry("a", 1))
        .message(19, string_int_entry("b", 2))
        .message(19, string_int_entry("a", 3))
        .finish();
    assert_eq!(
        to_compact(converter(), "pkg.Sample", &data),
        r#"{"counts":{"a":3,"b":2}}"#
    );
}

#[test]
fn test_map_keys_are_strings_and_can_be_sorted() {
    let data = Wire::new()
        .message(24, Wire::new().varint(1, 10).string(2, "ten"))
        .message(24, Wire::new().varint(1, 2).string(2, "two"))
        .finish();
    assert_eq!(
        to_compact(converter(), "pkg.Sample", &data),
        r#"{"labels":{"10":"ten","2":"two"}}"#
    );

    let sorted = converter()
        .with_json_options(
            JsonOptions::default()
                .with_multiline(false)
                .with_sorted_map_keys(true),
        )
        .convert_to_string("pkg.Sample", &data)
        .unwrap();
    assert_eq!(sorted, r#"{"labels":{"2":"two","10":"ten"}}"#);
}

#[test]
fn test_nested_and_repeated() {
    let inner = Wire::new()
        .string(1, "first")
        .message(2, Wire::new().varint(1, 3));
    let data = Wire::new()
        .raw(&[0x92, 0x01, 0x02, 0x01, 0x02])
        .message(20, inner)
        .message(21, Wire::new().string(1, "a"))
        .message(21, Wire::new())
        .string(25, "x")
        .string(25, "y")
        .finish();

    assert_eq!(
        to_json("pkg.Sample", &data),
        json!({
            "values": [1, 2],
            "inner": {"displayName": "first", "deep": {"level": 3}},
            "items": [{"displayName": "a"}, {}],
            "tags": ["x", "y"]
        })
    );
}

#[test]
fn test_group_renders_as_object() {
    let data = Wire::new()
        .start_group(3)
        .string(4, "note")
        .end_group(3)
        .varint(2, 0)
        .finish();
    assert_eq!(
        to_json("legacy.Record", &data),
        json!({"level": 0, "meta": {"note": "note"}})
    );
}

#[test]
fn test_declaration_order_not_wire_order() {
    let data = Wire::new()
        .string(12, "z")
        .varint(16, 1)
        .varint(1, 1)
        .finish();
    assert_eq!(
        to_compact(converter(), "pkg.Sample", &data),
        r#"{"count":1,"label":"z","color":"RED"}"#
    );
}

#[test]
fn test_proto_names_option() {
    let data = Wire::new()
        .message(20, Wire::new().string(1, "n"))
        .finish();
    let json = converter()
        .with_json_options(JsonOptions::default().with_proto_names(true))
        .convert("pkg.Sample", &data)
        .unwrap();
    assert_eq!(json, json!({"inner": {"display_name": "n"}}));
}

#[test]
fn test_unknown_fields_never_rendered() {
    let data = Wire::new()
        .varint(1, 1)
        .string(200, "hidden")
        .fixed32(201, 5)
        .finish();
    assert_eq!(to_json("pkg.Sample", &data), json!({"count": 1}));

    let json = converter()
        .with_decode_options(DecodeOptions::default().with_discard_unknown(true))
        .convert("pkg.Sample", &data)
        .unwrap();
    assert_eq!(json, json!({"count": 1}));
}

#[test]
fn test_multiline_output() {
    let data = Wire::new()
        .varint(1, 1)
        .message(20, Wire::new().string(1, "n"))
        .finish();
    let text = converter().convert_to_string("pkg.Sample", &data).unwrap();
    assert_eq!(
        text,
        "{\n  \"count\": 1,\n  \"inner\": {\n    \"displayName\": \"n\"\n  }\n}"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_malformed_bytes_produce_no_json() {
    let data = Wire::new().varint(1, 1).raw(&[0x62, 0x7F, b'a']).finish();
    let err = converter().convert_to_string("pkg.Sample", &data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_invalid_utf8_string_is_decode_error() {
    let data = Wire::new().bytes(12, &[0xC3, 0x28]).finish();
    let err = converter().convert("pkg.Sample", &data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_unknown_message_name() {
    let err = converter().convert("pkg.Missing", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Cross-check
// ============================================================================

#[test]
fn test_matches_prost_reflect_json() {
    let set = FileDescriptorSet {
        file: vec![sample_file()],
    };
    let pool = DescriptorPool::from_file_descriptor_set(set.clone()).unwrap();
    let sample = pool.get_message_by_name("pkg.Sample").unwrap();
    let inner = pool.get_message_by_name("pkg.Sample.Inner").unwrap();

    let mut nested = ReflectMessage::new(inner);
    nested.set_field_by_name("display_name", ReflectValue::String("inner".to_string()));

    let mut counts = HashMap::new();
    counts.insert(ReflectKey::String("a".to_string()), ReflectValue::I32(1));
    counts.insert(ReflectKey::String("b".to_string()), ReflectValue::I32(-2));
    let mut labels = HashMap::new();
    labels.insert(ReflectKey::I32(3), ReflectValue::String("three".to_string()));

    let mut message = ReflectMessage::new(sample);
    message.set_field_by_name("count", ReflectValue::I32(-7));
    message.set_field_by_name("big", ReflectValue::I64(i64::MIN));
    message.set_field_by_name("huge", ReflectValue::U64(u64::MAX));
    message.set_field_by_name("delta", ReflectValue::I32(-100));
    message.set_field_by_name("sf64", ReflectValue::I64(-1));
    message.set_field_by_name("flag", ReflectValue::Bool(true));
    message.set_field_by_name("label", ReflectValue::String("text".to_string()));
    message.set_field_by_name(
        "payload",
        ReflectValue::Bytes(prost::bytes::Bytes::from_static(b"\x00hello")),
    );
    message.set_field_by_name("color", ReflectValue::EnumNumber(1));
    message.set_field_by_name(
        "values",
        ReflectValue::List(vec![ReflectValue::I32(1), ReflectValue::I32(-1)]),
    );
    message.set_field_by_name("counts", ReflectValue::Map(counts));
    message.set_field_by_name("inner", ReflectValue::Message(nested.clone()));
    message.set_field_by_name("items", ReflectValue::List(vec![ReflectValue::Message(nested)]));
    message.set_field_by_name("code", ReflectValue::I32(12));
    message.set_field_by_name("labels", ReflectValue::Map(labels));
    message.set_field_by_name(
        "tags",
        ReflectValue::List(vec![ReflectValue::String("t".to_string())]),
    );

    let bytes = message.encode_to_vec();
    let expected = serde_json::to_value(&message).unwrap();

    let converter = Converter::from_descriptor_set(&set.encode_to_vec()).unwrap();
    let actual = converter.convert("pkg.Sample", &bytes).unwrap();
    assert_eq!(actual, expected);
}
