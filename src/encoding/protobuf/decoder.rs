// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Schema-driven Protobuf Decoder
//!
//! Decodes binary protobuf messages into a [`DynamicMessage`] using only a
//! message descriptor from a [`DescriptorIndex`], no generated code.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use proto2json::encoding::protobuf::ProtobufDecoder;
//! use proto2json::schema::DescriptorIndex;
//!
//! # let descriptor_set = vec![0u8; 0];
//! # let message_bytes = vec![0u8; 0];
//! let index = DescriptorIndex::from_bytes(&descriptor_set)?;
//! let descriptor = index.resolve("example.MyMessage")?;
//! let decoded = ProtobufDecoder::new(&index).decode(&descriptor, &message_bytes)?;
//! # Ok(())
//! # }
//! ```

use prost::encoding::WireType;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::wire::{decode_zigzag32, decode_zigzag64, WireCursor};
use crate::core::{CodecError, DynamicMessage, MapKey, MapValue, Result, UnknownField, Value};
use crate::schema::{Cardinality, DescriptorIndex, FieldDescriptor, Kind, MapEntry, MessageDescriptor};

/// Default nesting limit, the same one `prost` applies.
///
/// This is far below the 10,000 levels the Go runtime accepts, so valid
/// but deeply nested messages need [`DecodeOptions::with_recursion_limit`].
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Maximum depth of nested messages and groups. A map entry takes no
    /// level of its own; a message-valued entry counts once.
    pub recursion_limit: u32,

    /// Drop unknown fields instead of preserving their bytes
    pub discard_unknown: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            discard_unknown: false,
        }
    }
}

impl DecodeOptions {
    /// Set the nesting limit.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Drop unknown fields while decoding.
    pub fn with_discard_unknown(mut self, discard: bool) -> Self {
        self.discard_unknown = discard;
        self
    }
}

/// Protobuf decoder for messages described by a descriptor index.
pub struct ProtobufDecoder<'a> {
    index: &'a DescriptorIndex,
    options: DecodeOptions,
}

impl<'a> ProtobufDecoder<'a> {
    /// Create a decoder resolving referenced types through `index`.
    pub fn new(index: &'a DescriptorIndex) -> Self {
        Self {
            index,
            options: DecodeOptions::default(),
        }
    }

    /// Replace the decode options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode one message of the given type.
    ///
    /// Fields missing from the descriptor, or arriving with a wire type
    /// their declared kind cannot use, are kept as unknown fields.
    /// Truncated or malformed input fails the whole decode.
    pub fn decode(&self, descriptor: &MessageDescriptor, data: &[u8]) -> Result<DynamicMessage> {
        let mut cursor = WireCursor::new(data);
        let message =
            self.decode_message(descriptor, &mut cursor, None, self.options.recursion_limit)?;

        debug!(
            message = descriptor.full_name(),
            bytes = data.len(),
            fields = message.len(),
            unknown = message.unknown_fields().len(),
            "decoded message"
        );

        Ok(message)
    }

    /// Resolve a message type by name and decode `data` as that type.
    pub fn decode_by_name(&self, full_name: &str, data: &[u8]) -> Result<DynamicMessage> {
        let descriptor = self.index.resolve(full_name)?;
        self.decode(&descriptor, data)
    }

    fn decode_message(
        &self,
        descriptor: &MessageDescriptor,
        cursor: &mut WireCursor<'_>,
        end_group: Option<u32>,
        depth: u32,
    ) -> Result<DynamicMessage> {
        let mut message = DynamicMessage::new(descriptor.full_name());

        loop {
            if cursor.is_empty() {
                if let Some(number) = end_group {
                    return Err(CodecError::field_decode(
                        descriptor.full_name(),
                        "group",
                        cursor.pos() as u64,
                        format!("group {number} is not terminated"),
                    ));
                }
                return Ok(message);
            }

            let start = cursor.pos();
            let (number, wire_type) = cursor.read_key()?;

            if wire_type == WireType::EndGroup {
                return match end_group {
                    Some(expected) if expected == number => Ok(message),
                    _ => Err(CodecError::field_decode(
                        descriptor.full_name(),
                        "group",
                        start as u64,
                        format!("unexpected end-group tag for field {number}"),
                    )),
                };
            }

            match descriptor.field_by_number(number) {
                Some(field) if accepts_wire_type(field, wire_type) => {
                    self.decode_field(&mut message, descriptor, field, wire_type, cursor, depth)?
                }
                _ => {
                    cursor.skip_value(number, wire_type, depth)?;
                    if !self.options.discard_unknown {
                        trace!(
                            message = descriptor.full_name(),
                            number,
                            ?wire_type,
                            "preserving unknown field"
                        );
                        message.push_unknown(UnknownField {
                            number,
                            wire_type,
                            data: cursor.bytes_since(start).to_vec(),
                        });
                    }
                }
            }
        }
    }

    fn decode_field(
        &self,
        message: &mut DynamicMessage,
        descriptor: &MessageDescriptor,
        field: &FieldDescriptor,
        wire_type: WireType,
        cursor: &mut WireCursor<'_>,
        depth: u32,
    ) -> Result<()> {
        let number = field.number();

        match field.cardinality() {
            Cardinality::Map(entry) => {
                let mut payload = cursor.read_nested()?;
                let (key, value) = self.decode_map_entry(field, entry, &mut payload, depth)?;
                match message.get_mut(number) {
                    Some(Value::Map(entries)) => {
                        entries.insert(key, value);
                    }
                    _ => {
                        let mut entries = MapValue::new();
                        entries.insert(key, value);
                        message.set(number, Value::Map(entries));
                    }
                }
            }
            Cardinality::Repeated => {
                let mut values = Vec::new();
                if wire_type == WireType::LengthDelimited && field.kind().is_packable() {
                    let mut packed = cursor.read_nested()?;
                    while !packed.is_empty() {
                        values.push(self.read_value(field, &mut packed, depth)?);
                    }
                } else {
                    values.push(self.read_value(field, cursor, depth)?);
                }
                match message.get_mut(number) {
                    Some(Value::List(existing)) => existing.extend(values),
                    _ => message.set(number, Value::List(values)),
                }
            }
            Cardinality::Singular => {
                let value = self.read_value(field, cursor, depth)?;

                if let Some(oneof) = field.oneof_index() {
                    for sibling in descriptor.oneof_fields(oneof) {
                        if sibling.number() != number {
                            message.clear(sibling.number());
                        }
                    }
                }

                match value {
                    Value::Message(incoming) => match message.get_mut(number) {
                        Some(Value::Message(existing)) => existing.merge(incoming),
                        _ => message.set(number, Value::Message(incoming)),
                    },
                    value if !field.has_presence() && value.is_default() => {
                        message.clear(number);
                    }
                    value => message.set(number, value),
                }
            }
        }

        Ok(())
    }

    fn decode_map_entry(
        &self,
        field: &FieldDescriptor,
        entry: &MapEntry,
        payload: &mut WireCursor<'_>,
        depth: u32,
    ) -> Result<(MapKey, Value)> {
        let entry_descriptor = self.index.resolve(&entry.entry_type)?;
        let mut decoded = self.decode_message(&entry_descriptor, payload, None, depth)?;

        let key = match decoded.clear(1) {
            Some(key) => key,
            None => self.index.default_value(&entry.key)?,
        };
        let key = MapKey::from_value(key).ok_or_else(|| {
            CodecError::field_decode(
                field.name(),
                entry.key.as_str(),
                payload.pos() as u64,
                "map key is not a valid key type",
            )
        })?;
        let value = match decoded.clear(2) {
            Some(value) => value,
            None => self.index.default_value(&entry.value)?,
        };

        Ok((key, value))
    }

    fn read_value(
        &self,
        field: &FieldDescriptor,
        cursor: &mut WireCursor<'_>,
        depth: u32,
    ) -> Result<Value> {
        let value = match field.kind() {
            Kind::Double => Value::F64(f64::from_bits(cursor.read_fixed64()?)),
            Kind::Float => Value::F32(f32::from_bits(cursor.read_fixed32()?)),
            Kind::Int64 => Value::I64(cursor.read_varint()? as i64),
            Kind::UInt64 => Value::U64(cursor.read_varint()?),
            // 32-bit varints are truncated, as every protobuf runtime does
            Kind::Int32 => Value::I32(cursor.read_varint()? as i32),
            Kind::UInt32 => Value::U32(cursor.read_varint()? as u32),
            Kind::Enum(_) => Value::EnumNumber(cursor.read_varint()? as i32),
            Kind::Fixed64 => Value::U64(cursor.read_fixed64()?),
            Kind::Fixed32 => Value::U32(cursor.read_fixed32()?),
            Kind::SFixed64 => Value::I64(cursor.read_fixed64()? as i64),
            Kind::SFixed32 => Value::I32(cursor.read_fixed32()? as i32),
            Kind::SInt64 => Value::I64(decode_zigzag64(cursor.read_varint()?)),
            Kind::SInt32 => Value::I32(decode_zigzag32(cursor.read_varint()? as u32)),
            Kind::Bool => Value::Bool(cursor.read_varint()? != 0),
            Kind::String => {
                let start = cursor.pos();
                let bytes = cursor.read_length_delimited()?;
                let text = std::str::from_utf8(bytes).map_err(|err| {
                    CodecError::field_decode(field.name(), "string", start as u64, err.to_string())
                })?;
                Value::String(text.to_string())
            }
            Kind::Bytes => Value::Bytes(cursor.read_length_delimited()?.to_vec()),
            Kind::Message(type_name) => {
                if depth == 0 {
                    return Err(CodecError::recursion_limit(self.options.recursion_limit));
                }
                let descriptor = self.index.resolve(type_name)?;
                let mut payload = cursor.read_nested()?;
                Value::Message(self.decode_message(&descriptor, &mut payload, None, depth - 1)?)
            }
            Kind::Group(type_name) => {
                if depth == 0 {
                    return Err(CodecError::recursion_limit(self.options.recursion_limit));
                }
                let descriptor = self.index.resolve(type_name)?;
                Value::Message(self.decode_message(
                    &descriptor,
                    cursor,
                    Some(field.number()),
                    depth - 1,
                )?)
            }
        };

        Ok(value)
    }
}

/// Whether a known field can be read from a value with this wire type.
fn accepts_wire_type(field: &FieldDescriptor, wire_type: WireType) -> bool {
    if wire_type == field.kind().wire_type() {
        return true;
    }
    field.is_list() && field.kind().is_packable() && wire_type == WireType::LengthDelimited
}
