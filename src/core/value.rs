// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic message value tree.
//!
//! A [`DynamicMessage`] is built purely from a message descriptor and the
//! wire bytes, with no generated type behind it. Only fields that were
//! actually present on the wire are stored; anything the schema does not
//! know about is kept verbatim as an [`UnknownField`].

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use prost::encoding::WireType;

/// Ordered map field contents: first-seen key order, last value wins.
pub type MapValue = IndexMap<MapKey, Value>;

/// A schema-typed value decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value by number; the name is looked up at projection time
    EnumNumber(i32),
    Message(DynamicMessage),
    /// Repeated field contents in wire order
    List(Vec<Value>),
    Map(MapValue),
}

impl Value {
    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Check whether this value equals the zero value of its kind.
    ///
    /// Used for implicit-presence fields, which are not tracked as
    /// present when they hold their default.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(v) => !*v,
            Value::I32(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            // -0.0 has a distinct encoding and stays present
            Value::F32(v) => v.to_bits() == 0,
            Value::F64(v) => v.to_bits() == 0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::EnumNumber(n) => *n == 0,
            Value::Message(_) => false,
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner message.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get the inner list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get the inner map.
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Try to convert this value to i64 (for integer and enum values).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) | Value::EnumNumber(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            Value::U32(v) => Some(*v as i64),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to u64 (for non-negative integers).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U32(v) => Some(*v as u64),
            Value::U64(v) => Some(*v),
            Value::I32(v) | Value::EnumNumber(v) => u64::try_from(*v).ok(),
            Value::I64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to f64 (for float values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Key of a map field entry.
///
/// Protobuf restricts map keys to integral, bool and string kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl MapKey {
    /// Convert a decoded entry key into a map key.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(MapKey::Bool(v)),
            Value::I32(v) => Some(MapKey::I32(v)),
            Value::I64(v) => Some(MapKey::I64(v)),
            Value::U32(v) => Some(MapKey::U32(v)),
            Value::U64(v) => Some(MapKey::U64(v)),
            Value::String(v) => Some(MapKey::String(v)),
            _ => None,
        }
    }
}

/// Renders the key the way JSON object keys are written.
impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(v) => write!(f, "{v}"),
            MapKey::I32(v) => write!(f, "{v}"),
            MapKey::I64(v) => write!(f, "{v}"),
            MapKey::U32(v) => write!(f, "{v}"),
            MapKey::U64(v) => write!(f, "{v}"),
            MapKey::String(v) => f.write_str(v),
        }
    }
}

/// A field the schema does not describe, kept byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    /// Field number from the tag
    pub number: u32,
    /// Wire type from the tag
    pub wire_type: WireType,
    /// Full encoding of the field, tag included
    pub data: Vec<u8>,
}

/// One field of a [`DynamicMessage`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// Field described by the schema
    Known { number: u32, value: &'a Value },
    /// Opaque field preserved for round-trips
    Unknown(&'a UnknownField),
}

impl Field<'_> {
    /// Field number of either variant.
    pub fn number(&self) -> u32 {
        match self {
            Field::Known { number, .. } => *number,
            Field::Unknown(unknown) => unknown.number,
        }
    }
}

/// A message value shaped by a message descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicMessage {
    type_name: String,
    fields: BTreeMap<u32, Value>,
    unknown: Vec<UnknownField>,
}

impl DynamicMessage {
    /// Create an empty message of the given fully qualified type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }

    /// Fully qualified name of the message type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get a present field by number.
    pub fn get(&self, number: u32) -> Option<&Value> {
        self.fields.get(&number)
    }

    /// Get a mutable reference to a present field.
    pub fn get_mut(&mut self, number: u32) -> Option<&mut Value> {
        self.fields.get_mut(&number)
    }

    /// Check whether a field is present.
    pub fn has(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, number: u32, value: Value) {
        self.fields.insert(number, value);
    }

    /// Remove a field, returning its value if it was present.
    pub fn clear(&mut self, number: u32) -> Option<Value> {
        self.fields.remove(&number)
    }

    /// Number of present known fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether no known field is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Record a field the schema does not describe.
    pub fn push_unknown(&mut self, field: UnknownField) {
        self.unknown.push(field);
    }

    /// Unknown fields in wire order.
    pub fn unknown_fields(&self) -> &[UnknownField] {
        &self.unknown
    }

    /// Unknown fields re-encoded exactly as they were read.
    pub fn unknown_bytes(&self) -> Vec<u8> {
        self.unknown
            .iter()
            .flat_map(|field| field.data.iter().copied())
            .collect()
    }

    /// Iterate known fields by number, then unknown fields in wire order.
    pub fn iter(&self) -> impl Iterator<Item = Field<'_>> {
        self.fields
            .iter()
            .map(|(number, value)| Field::Known {
                number: *number,
                value,
            })
            .chain(self.unknown.iter().map(Field::Unknown))
    }

    /// Merge another message of the same type into this one.
    ///
    /// Follows the wire merge rules: singular scalars are replaced,
    /// messages merge recursively, lists append and maps override per key.
    pub fn merge(&mut self, other: DynamicMessage) {
        for (number, value) in other.fields {
            match (self.fields.get_mut(&number), value) {
                (Some(Value::Message(existing)), Value::Message(incoming)) => {
                    existing.merge(incoming)
                }
                (Some(Value::List(existing)), Value::List(incoming)) => existing.extend(incoming),
                (Some(Value::Map(existing)), Value::Map(incoming)) => existing.extend(incoming),
                (_, value) => {
                    self.fields.insert(number, value);
                }
            }
        }
        self.unknown.extend(other.unknown);
    }
}
