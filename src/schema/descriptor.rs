// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema descriptors built from compiled `.proto` files.
//!
//! These are immutable views over `prost-types` descriptor records. Each
//! [`FileDescriptor`] owns its top-level messages and enums, and each
//! [`MessageDescriptor`] owns its nested types. Type references between
//! fields and messages are kept as fully qualified names and resolved
//! through the [`DescriptorIndex`](super::index::DescriptorIndex).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use prost::encoding::WireType;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto};

use super::naming::to_json_name;
use crate::core::{CodecError, Result};

/// Protobuf source syntax of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Proto2,
    Proto3,
    /// Edition 2023 and later. `prost-types` does not carry feature sets,
    /// so every singular field gets explicit presence even where
    /// `features.field_presence = IMPLICIT` is set.
    Editions,
}

impl Syntax {
    fn from_proto(syntax: Option<&str>) -> Result<Self> {
        match syntax {
            None | Some("") | Some("proto2") => Ok(Syntax::Proto2),
            Some("proto3") => Ok(Syntax::Proto3),
            Some("editions") => Ok(Syntax::Editions),
            Some(other) => Err(CodecError::invalid_schema(
                other,
                "unrecognized syntax declaration",
            )),
        }
    }
}

/// Declared type of a field.
///
/// Message, group and enum kinds carry the fully qualified name of the
/// referenced type, without a leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group(String),
    Message(String),
    Bytes,
    UInt32,
    Enum(String),
    SFixed32,
    SFixed64,
    SInt32,
    SInt64,
}

impl Kind {
    fn from_proto(field: &FieldDescriptorProto, scope: &str) -> Result<Self> {
        let type_name = || {
            field
                .type_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| name.trim_start_matches('.').to_string())
                .ok_or_else(|| {
                    CodecError::invalid_schema(
                        format!("{scope}.{}", field.name()),
                        "field references a type but has no type name",
                    )
                })
        };

        if field.r#type.is_none() {
            return Err(CodecError::invalid_schema(
                format!("{scope}.{}", field.name()),
                "field has no declared type",
            ));
        }

        let kind = match field.r#type() {
            Type::Double => Kind::Double,
            Type::Float => Kind::Float,
            Type::Int64 => Kind::Int64,
            Type::Uint64 => Kind::UInt64,
            Type::Int32 => Kind::Int32,
            Type::Fixed64 => Kind::Fixed64,
            Type::Fixed32 => Kind::Fixed32,
            Type::Bool => Kind::Bool,
            Type::String => Kind::String,
            Type::Group => Kind::Group(type_name()?),
            Type::Message => Kind::Message(type_name()?),
            Type::Bytes => Kind::Bytes,
            Type::Uint32 => Kind::UInt32,
            Type::Enum => Kind::Enum(type_name()?),
            Type::Sfixed32 => Kind::SFixed32,
            Type::Sfixed64 => Kind::SFixed64,
            Type::Sint32 => Kind::SInt32,
            Type::Sint64 => Kind::SInt64,
        };
        Ok(kind)
    }

    /// Wire type a single (unpacked) value of this kind is encoded with.
    pub fn wire_type(&self) -> WireType {
        match self {
            Kind::Int64
            | Kind::UInt64
            | Kind::Int32
            | Kind::Bool
            | Kind::UInt32
            | Kind::Enum(_)
            | Kind::SInt32
            | Kind::SInt64 => WireType::Varint,
            Kind::Double | Kind::Fixed64 | Kind::SFixed64 => WireType::SixtyFourBit,
            Kind::Float | Kind::Fixed32 | Kind::SFixed32 => WireType::ThirtyTwoBit,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
            Kind::Group(_) => WireType::StartGroup,
        }
    }

    /// Whether repeated values of this kind may use packed encoding.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            Kind::String | Kind::Bytes | Kind::Message(_) | Kind::Group(_)
        )
    }

    /// Whether values of this kind are messages.
    pub fn is_message(&self) -> bool {
        matches!(self, Kind::Message(_) | Kind::Group(_))
    }

    /// Fully qualified name of the referenced message or enum type.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Kind::Group(name) | Kind::Message(name) | Kind::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Protobuf keyword for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Int64 => "int64",
            Kind::UInt64 => "uint64",
            Kind::Int32 => "int32",
            Kind::Fixed64 => "fixed64",
            Kind::Fixed32 => "fixed32",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Group(_) => "group",
            Kind::Message(_) => "message",
            Kind::Bytes => "bytes",
            Kind::UInt32 => "uint32",
            Kind::Enum(_) => "enum",
            Kind::SFixed32 => "sfixed32",
            Kind::SFixed64 => "sfixed64",
            Kind::SInt32 => "sint32",
            Kind::SInt64 => "sint64",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name() {
            Some(name) => write!(f, "{} {name}", self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

/// Key and value layout of a map field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Fully qualified name of the synthesized entry message
    pub entry_type: String,
    /// Kind of field 1 (`key`)
    pub key: Kind,
    /// Kind of field 2 (`value`)
    pub value: Kind,
}

/// How many values a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
    Map(MapEntry),
}

/// A field of a message type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    json_name: String,
    number: u32,
    kind: Kind,
    cardinality: Cardinality,
    oneof_index: Option<usize>,
    has_presence: bool,
}

impl FieldDescriptor {
    /// Declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// lowerCamelCase name used as the JSON key.
    pub fn json_name(&self) -> &str {
        &self.json_name
    }

    /// Field number (tag).
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Declared type.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Singular, repeated or map.
    pub fn cardinality(&self) -> &Cardinality {
        &self.cardinality
    }

    /// Whether the field is repeated (maps excluded).
    pub fn is_list(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated)
    }

    /// Whether the field is a map.
    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map(_))
    }

    /// Map layout, if this is a map field.
    pub fn map_entry(&self) -> Option<&MapEntry> {
        match &self.cardinality {
            Cardinality::Map(entry) => Some(entry),
            _ => None,
        }
    }

    /// Index of the containing oneof in the parent message, if any.
    pub fn oneof_index(&self) -> Option<usize> {
        self.oneof_index
    }

    /// Whether an explicitly set default value is distinguishable from unset.
    ///
    /// False for repeated fields, maps and proto3 scalars declared without
    /// `optional`; those only count as present when non-default.
    pub fn has_presence(&self) -> bool {
        self.has_presence
    }
}

/// A oneof group declared in a message.
#[derive(Debug, Clone)]
pub struct OneofDescriptor {
    name: String,
    synthetic: bool,
}

impl OneofDescriptor {
    /// Declared oneof name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the oneof was synthesized for a proto3 `optional` field.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

/// A value of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// An enum type.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    name: String,
    full_name: String,
    values: Vec<EnumValue>,
}

impl EnumDescriptor {
    fn from_proto(proto: &EnumDescriptorProto, scope: &str) -> Result<Self> {
        let full_name = qualify(scope, proto.name());
        if proto.value.is_empty() {
            return Err(CodecError::invalid_schema(
                full_name,
                "enum declares no values",
            ));
        }
        let values = proto
            .value
            .iter()
            .map(|value| EnumValue {
                name: value.name().to_string(),
                number: value.number(),
            })
            .collect();

        Ok(Self {
            name: proto.name().to_string(),
            full_name,
            values,
        })
    }

    /// Short name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// The first declared value, which is the implicit default.
    pub fn default_value(&self) -> &EnumValue {
        // Construction rejects enums without values.
        &self.values[0]
    }

    /// Find the first value declared with the given number.
    ///
    /// With `allow_alias` several names share a number; the first wins.
    pub fn value_by_number(&self, number: i32) -> Option<&EnumValue> {
        self.values.iter().find(|value| value.number == number)
    }
}

/// A message type.
#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    name: String,
    full_name: String,
    file_name: String,
    fields: Vec<FieldDescriptor>,
    field_numbers: HashMap<u32, usize>,
    oneofs: Vec<OneofDescriptor>,
    nested_messages: Vec<Arc<MessageDescriptor>>,
    nested_enums: Vec<Arc<EnumDescriptor>>,
    map_entry: bool,
}

impl MessageDescriptor {
    fn from_proto(
        proto: &DescriptorProto,
        scope: &str,
        file_name: &str,
        syntax: Syntax,
    ) -> Result<Self> {
        let full_name = qualify(scope, proto.name());

        let nested_messages = proto
            .nested_type
            .iter()
            .map(|nested| {
                MessageDescriptor::from_proto(nested, &full_name, file_name, syntax).map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;
        let nested_enums = proto
            .enum_type
            .iter()
            .map(|nested| EnumDescriptor::from_proto(nested, &full_name).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let mut fields = Vec::with_capacity(proto.field.len());
        let mut field_numbers = HashMap::with_capacity(proto.field.len());
        for field in &proto.field {
            let descriptor =
                build_field(field, &full_name, syntax, &nested_messages, proto.oneof_decl.len())?;
            if field_numbers
                .insert(descriptor.number, fields.len())
                .is_some()
            {
                return Err(CodecError::invalid_schema(
                    &full_name,
                    format!("field number {} is used twice", descriptor.number),
                ));
            }
            fields.push(descriptor);
        }

        let oneofs = proto
            .oneof_decl
            .iter()
            .enumerate()
            .map(|(index, oneof)| OneofDescriptor {
                name: oneof.name().to_string(),
                synthetic: proto.field.iter().any(|field| {
                    field.oneof_index == Some(index as i32) && field.proto3_optional()
                }),
            })
            .collect();

        Ok(Self {
            name: proto.name().to_string(),
            full_name,
            file_name: file_name.to_string(),
            fields,
            field_numbers,
            oneofs,
            nested_messages,
            nested_enums,
            map_entry: proto
                .options
                .as_ref()
                .and_then(|options| options.map_entry)
                .unwrap_or(false),
        })
    }

    /// Short name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name, including package and enclosing messages.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Name of the file that declares this message.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by number.
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.field_numbers
            .get(&number)
            .map(|&index| &self.fields[index])
    }

    /// Look up a field by declared name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Oneof groups in declaration order.
    pub fn oneofs(&self) -> &[OneofDescriptor] {
        &self.oneofs
    }

    /// Fields that belong to the given oneof.
    pub fn oneof_fields(&self, oneof_index: usize) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |field| field.oneof_index == Some(oneof_index))
    }

    /// Directly nested message types.
    pub fn nested_messages(&self) -> &[Arc<MessageDescriptor>] {
        &self.nested_messages
    }

    /// Directly nested enum types.
    pub fn nested_enums(&self) -> &[Arc<EnumDescriptor>] {
        &self.nested_enums
    }

    /// Whether this is a synthesized map entry type.
    pub fn is_map_entry(&self) -> bool {
        self.map_entry
    }

    /// Whether this is one of the `google.protobuf` well-known types.
    pub fn is_well_known(&self) -> bool {
        self.full_name.starts_with("google.protobuf.")
    }
}

fn build_field(
    field: &FieldDescriptorProto,
    scope: &str,
    syntax: Syntax,
    nested_messages: &[Arc<MessageDescriptor>],
    oneof_count: usize,
) -> Result<FieldDescriptor> {
    let path = || format!("{scope}.{}", field.name());

    if field.name().is_empty() {
        return Err(CodecError::invalid_schema(scope, "field has no name"));
    }
    let number = u32::try_from(field.number())
        .ok()
        .filter(|&n| n > 0 && n <= MAX_FIELD_NUMBER)
        .ok_or_else(|| {
            CodecError::invalid_schema(path(), format!("invalid field number {}", field.number()))
        })?;

    let kind = Kind::from_proto(field, scope)?;

    let oneof_index = match field.oneof_index {
        Some(index) => {
            let index = usize::try_from(index)
                .ok()
                .filter(|&i| i < oneof_count)
                .ok_or_else(|| CodecError::invalid_schema(path(), "oneof index out of range"))?;
            Some(index)
        }
        None => None,
    };

    let repeated = field.label() == Label::Repeated;
    let cardinality = if !repeated {
        Cardinality::Singular
    } else {
        match &kind {
            Kind::Message(type_name) => match nested_messages
                .iter()
                .find(|nested| nested.is_map_entry() && nested.full_name() == type_name)
            {
                Some(entry) => Cardinality::Map(map_entry_layout(entry)?),
                None => Cardinality::Repeated,
            },
            _ => Cardinality::Repeated,
        }
    };

    let has_presence = match cardinality {
        Cardinality::Singular => {
            kind.is_message()
                || oneof_index.is_some()
                || field.proto3_optional()
                || syntax != Syntax::Proto3
        }
        _ => false,
    };

    let json_name = field
        .json_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| to_json_name(field.name()));

    Ok(FieldDescriptor {
        name: field.name().to_string(),
        json_name,
        number,
        kind,
        cardinality,
        oneof_index,
        has_presence,
    })
}

fn map_entry_layout(entry: &MessageDescriptor) -> Result<MapEntry> {
    let key = entry.field_by_number(1).ok_or_else(|| {
        CodecError::invalid_schema(entry.full_name(), "map entry has no key field")
    })?;
    let value = entry.field_by_number(2).ok_or_else(|| {
        CodecError::invalid_schema(entry.full_name(), "map entry has no value field")
    })?;

    if matches!(
        key.kind(),
        Kind::Double | Kind::Float | Kind::Bytes | Kind::Message(_) | Kind::Group(_) | Kind::Enum(_)
    ) {
        return Err(CodecError::invalid_schema(
            entry.full_name(),
            format!("'{}' is not a valid map key type", key.kind()),
        ));
    }

    Ok(MapEntry {
        entry_type: entry.full_name().to_string(),
        key: key.kind().clone(),
        value: value.kind().clone(),
    })
}

/// Largest field number protobuf allows.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// A compiled `.proto` file.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    name: String,
    package: String,
    syntax: Syntax,
    messages: Vec<Arc<MessageDescriptor>>,
    enums: Vec<Arc<EnumDescriptor>>,
}

impl FileDescriptor {
    /// Build a file descriptor and all of its nested types.
    pub fn from_proto(proto: &FileDescriptorProto) -> Result<Self> {
        let name = proto.name().to_string();
        let package = proto.package().to_string();
        let syntax = Syntax::from_proto(proto.syntax.as_deref())?;

        let messages = proto
            .message_type
            .iter()
            .map(|message| {
                MessageDescriptor::from_proto(message, &package, &name, syntax).map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;
        let enums = proto
            .enum_type
            .iter()
            .map(|nested| EnumDescriptor::from_proto(nested, &package).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            package,
            syntax,
            messages,
            enums,
        })
    }

    /// File name as given to the compiler.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package name, empty when the file declares none.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Declared syntax.
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Top-level messages in declaration order.
    pub fn messages(&self) -> &[Arc<MessageDescriptor>] {
        &self.messages
    }

    /// Top-level enums in declaration order.
    pub fn enums(&self) -> &[Arc<EnumDescriptor>] {
        &self.enums
    }
}
