// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use prost::encoding::{encode_key, encode_varint, WireType};
use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MessageOptions, OneofDescriptorProto,
};

use proto2json::DescriptorIndex;

// ============================================================================
// Descriptor Builders
// ============================================================================

/// Singular scalar field.
pub fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

/// Repeated scalar field.
pub fn repeated(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..field(name, number, ty)
    }
}

/// Field referencing a message type by fully qualified name.
pub fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(format!(".{type_name}")),
        ..field(name, number, Type::Message)
    }
}

/// Repeated message field.
pub fn repeated_message(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..message_field(name, number, type_name)
    }
}

/// Field referencing an enum type by fully qualified name.
pub fn enum_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(format!(".{type_name}")),
        ..field(name, number, Type::Enum)
    }
}

/// proto3 `optional` field with its synthetic oneof at `oneof_index`.
pub fn proto3_optional(name: &str, number: i32, ty: Type, oneof_index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        proto3_optional: Some(true),
        oneof_index: Some(oneof_index),
        ..field(name, number, ty)
    }
}

/// Put a field into the oneof at `oneof_index`.
pub fn in_oneof(mut field: FieldDescriptorProto, oneof_index: i32) -> FieldDescriptorProto {
    field.oneof_index = Some(oneof_index);
    field
}

pub fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

/// Synthesized map entry message, as protoc emits it.
pub fn map_entry(name: &str, key: FieldDescriptorProto, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: vec![
            FieldDescriptorProto {
                name: Some("key".to_string()),
                number: Some(1),
                ..key
            },
            FieldDescriptorProto {
                name: Some("value".to_string()),
                number: Some(2),
                ..value
            },
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Map field whose entry type `entry` is nested in `parent`.
pub fn map_field(name: &str, number: i32, parent: &str, entry: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..message_field(name, number, &format!("{parent}.{entry}"))
    }
}

pub fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_string()),
                number: Some(*number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

pub fn file(name: &str, package: &str, syntax: &str, messages: Vec<DescriptorProto>) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        syntax: Some(syntax.to_string()),
        message_type: messages,
        ..Default::default()
    }
}

pub fn encode_set(files: Vec<FileDescriptorProto>) -> Vec<u8> {
    FileDescriptorSet { file: files }.encode_to_vec()
}

pub fn index_of(files: Vec<FileDescriptorProto>) -> DescriptorIndex {
    DescriptorIndex::load(FileDescriptorSet { file: files }).expect("fixture schema loads")
}

// ============================================================================
// Fixture Schemas
// ============================================================================

/// proto3 schema `pkg` exercising every field kind.
///
/// ```proto
/// syntax = "proto3";
/// package pkg;
/// enum Color { COLOR_UNSPECIFIED = 0; RED = 1; GREEN = 2; }
/// message Sample {
///   int32 count = 1;  int64 big = 2;  uint32 small = 3;  uint64 huge = 4;
///   sint32 delta = 5;  sint64 offset = 6;  fixed32 f32 = 7;  fixed64 f64 = 8;
///   sfixed32 sf32 = 9;  sfixed64 sf64 = 10;  bool flag = 11;  string label = 12;
///   bytes payload = 13;  double ratio = 14;  float scale = 15;  Color color = 16;
///   optional bool maybe = 17;  repeated int32 values = 18;
///   map<string, int32> counts = 19;  Inner inner = 20;  repeated Inner items = 21;
///   oneof choice { string name = 22; int32 code = 23; }
///   map<int32, string> labels = 24;  repeated string tags = 25;
///   message Inner { string display_name = 1; Deep deep = 2;
///     message Deep { int32 level = 1; } }
/// }
/// message Other { string id = 1; }
/// ```
pub fn sample_file() -> FileDescriptorProto {
    let deep = message("Deep", vec![field("level", 1, Type::Int32)]);
    let mut inner = message(
        "Inner",
        vec![
            field("display_name", 1, Type::String),
            message_field("deep", 2, "pkg.Sample.Inner.Deep"),
        ],
    );
    inner.nested_type.push(deep);

    let mut sample = message(
        "Sample",
        vec![
            field("count", 1, Type::Int32),
            field("big", 2, Type::Int64),
            field("small", 3, Type::Uint32),
            field("huge", 4, Type::Uint64),
            field("delta", 5, Type::Sint32),
            field("offset", 6, Type::Sint64),
            field("f32", 7, Type::Fixed32),
            field("f64", 8, Type::Fixed64),
            field("sf32", 9, Type::Sfixed32),
            field("sf64", 10, Type::Sfixed64),
            field("flag", 11, Type::Bool),
            field("label", 12, Type::String),
            field("payload", 13, Type::Bytes),
            field("ratio", 14, Type::Double),
            field("scale", 15, Type::Float),
            enum_field("color", 16, "pkg.Color"),
            proto3_optional("maybe", 17, Type::Bool, 1),
            repeated("values", 18, Type::Int32),
            map_field("counts", 19, "pkg.Sample", "CountsEntry"),
            message_field("inner", 20, "pkg.Sample.Inner"),
            repeated_message("items", 21, "pkg.Sample.Inner"),
            in_oneof(field("name", 22, Type::String), 0),
            in_oneof(field("code", 23, Type::Int32), 0),
            map_field("labels", 24, "pkg.Sample", "LabelsEntry"),
            repeated("tags", 25, Type::String),
        ],
    );
    sample.oneof_decl = vec![oneof("choice"), oneof("_maybe")];
    sample.nested_type = vec![
        inner,
        map_entry(
            "CountsEntry",
            field("key", 1, Type::String),
            field("value", 2, Type::Int32),
        ),
        map_entry(
            "LabelsEntry",
            field("key", 1, Type::Int32),
            field("value", 2, Type::String),
        ),
    ];

    let mut file = file(
        "sample.proto",
        "pkg",
        "proto3",
        vec![sample, message("Other", vec![field("id", 1, Type::String)])],
    );
    file.enum_type
        .push(enumeration("Color", &[("COLOR_UNSPECIFIED", 0), ("RED", 1), ("GREEN", 2)]));
    file
}

/// proto2 schema `legacy` with explicit presence and a group.
///
/// ```proto
/// syntax = "proto2";
/// package legacy;
/// message Record {
///   optional bool enabled = 1;  optional int32 level = 2;
///   optional group Meta = 3 { optional string note = 4; }
/// }
/// ```
pub fn legacy_file() -> FileDescriptorProto {
    let mut record = message(
        "Record",
        vec![
            field("enabled", 1, Type::Bool),
            field("level", 2, Type::Int32),
            FieldDescriptorProto {
                type_name: Some(".legacy.Record.Meta".to_string()),
                ..field("meta", 3, Type::Group)
            },
        ],
    );
    record
        .nested_type
        .push(message("Meta", vec![field("note", 4, Type::String)]));
    file("legacy.proto", "legacy", "proto2", vec![record])
}

/// The `google.protobuf` well-known types with their standard layout.
pub fn well_known_file() -> FileDescriptorProto {
    let seconds_nanos = |name: &str| {
        message(
            name,
            vec![field("seconds", 1, Type::Int64), field("nanos", 2, Type::Int32)],
        )
    };
    let wrapper = |name: &str, ty: Type| message(name, vec![field("value", 1, ty)]);

    let mut structure = message(
        "Struct",
        vec![map_field("fields", 1, "google.protobuf.Struct", "FieldsEntry")],
    );
    structure.nested_type.push(map_entry(
        "FieldsEntry",
        field("key", 1, Type::String),
        message_field("value", 2, "google.protobuf.Value"),
    ));

    let mut value = message(
        "Value",
        vec![
            in_oneof(enum_field("null_value", 1, "google.protobuf.NullValue"), 0),
            in_oneof(field("number_value", 2, Type::Double), 0),
            in_oneof(field("string_value", 3, Type::String), 0),
            in_oneof(field("bool_value", 4, Type::Bool), 0),
            in_oneof(message_field("struct_value", 5, "google.protobuf.Struct"), 0),
            in_oneof(message_field("list_value", 6, "google.protobuf.ListValue"), 0),
        ],
    );
    value.oneof_decl.push(oneof("kind"));

    let mut file = file(
        "google/protobuf/well_known.proto",
        "google.protobuf",
        "proto3",
        vec![
            seconds_nanos("Timestamp"),
            seconds_nanos("Duration"),
            wrapper("DoubleValue", Type::Double),
            wrapper("FloatValue", Type::Float),
            wrapper("Int64Value", Type::Int64),
            wrapper("UInt64Value", Type::Uint64),
            wrapper("Int32Value", Type::Int32),
            wrapper("UInt32Value", Type::Uint32),
            wrapper("BoolValue", Type::Bool),
            wrapper("StringValue", Type::String),
            wrapper("BytesValue", Type::Bytes),
            structure,
            value,
            message(
                "ListValue",
                vec![repeated_message("values", 1, "google.protobuf.Value")],
            ),
            message("FieldMask", vec![repeated("paths", 1, Type::String)]),
            message("Empty", vec![]),
            message(
                "Any",
                vec![field("type_url", 1, Type::String), field("value", 2, Type::Bytes)],
            ),
        ],
    );
    file.enum_type.push(enumeration("NullValue", &[("NULL_VALUE", 0)]));
    file
}

/// Schema `app` using the well-known types.
///
/// ```proto
/// message Event {
///   google.protobuf.Timestamp at = 1;  google.protobuf.Duration took = 2;
///   google.protobuf.Int64Value total = 3;  google.protobuf.StringValue note = 4;
///   google.protobuf.Struct attrs = 5;  google.protobuf.FieldMask mask = 6;
///   google.protobuf.Empty nothing = 7;  google.protobuf.Any detail = 8;
///   google.protobuf.BoolValue enabled = 9;  google.protobuf.NullValue gap = 10;
///   repeated google.protobuf.Value extras = 11;
/// }
/// ```
pub fn event_file() -> FileDescriptorProto {
    let mut file = file(
        "app/event.proto",
        "app",
        "proto3",
        vec![message(
            "Event",
            vec![
                message_field("at", 1, "google.protobuf.Timestamp"),
                message_field("took", 2, "google.protobuf.Duration"),
                message_field("total", 3, "google.protobuf.Int64Value"),
                message_field("note", 4, "google.protobuf.StringValue"),
                message_field("attrs", 5, "google.protobuf.Struct"),
                message_field("mask", 6, "google.protobuf.FieldMask"),
                message_field("nothing", 7, "google.protobuf.Empty"),
                message_field("detail", 8, "google.protobuf.Any"),
                message_field("enabled", 9, "google.protobuf.BoolValue"),
                enum_field("gap", 10, "google.protobuf.NullValue"),
                repeated_message("extras", 11, "google.protobuf.Value"),
            ],
        )],
    );
    file.dependency
        .push("google/protobuf/well_known.proto".to_string());
    file
}

// ============================================================================
// Wire Writer
// ============================================================================

/// Minimal protobuf wire encoder for building test inputs byte by byte.
#[derive(Debug, Default, Clone)]
pub struct Wire {
    buf: Vec<u8>,
}

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn varint(mut self, number: u32, value: u64) -> Self {
        encode_key(number, WireType::Varint, &mut self.buf);
        encode_varint(value, &mut self.buf);
        self
    }

    pub fn sint(self, number: u32, value: i64) -> Self {
        self.varint(number, ((value << 1) ^ (value >> 63)) as u64)
    }

    pub fn fixed32(mut self, number: u32, value: u32) -> Self {
        encode_key(number, WireType::ThirtyTwoBit, &mut self.buf);
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn fixed64(mut self, number: u32, value: u64) -> Self {
        encode_key(number, WireType::SixtyFourBit, &mut self.buf);
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn bytes(mut self, number: u32, value: &[u8]) -> Self {
        encode_key(number, WireType::LengthDelimited, &mut self.buf);
        encode_varint(value.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(value);
        self
    }

    pub fn string(self, number: u32, value: &str) -> Self {
        self.bytes(number, value.as_bytes())
    }

    pub fn message(self, number: u32, inner: Wire) -> Self {
        self.bytes(number, &inner.finish())
    }

    pub fn start_group(mut self, number: u32) -> Self {
        encode_key(number, WireType::StartGroup, &mut self.buf);
        self
    }

    pub fn end_group(mut self, number: u32) -> Self {
        encode_key(number, WireType::EndGroup, &mut self.buf);
        self
    }

    /// Append raw bytes, e.g. a truncated tail.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Map entry payload with a string key and varint value.
pub fn string_int_entry(key: &str, value: u64) -> Wire {
    Wire::new().string(1, key).varint(2, value)
}
