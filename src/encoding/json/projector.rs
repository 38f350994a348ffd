// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Canonical JSON Projector
//!
//! Renders a [`DynamicMessage`] as JSON following the canonical protobuf
//! JSON mapping.
//!
//! Fields are written in declaration order under their lowerCamelCase
//! name. Absent fields are omitted, 64-bit integers become strings, bytes
//! become base64 and enums their symbolic name. Unknown fields are never
//! written.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use proto2json::encoding::json::JsonProjector;
//! use proto2json::encoding::protobuf::ProtobufDecoder;
//! use proto2json::schema::DescriptorIndex;
//!
//! # let descriptor_set = vec![0u8; 0];
//! # let message_bytes = vec![0u8; 0];
//! let index = DescriptorIndex::from_bytes(&descriptor_set)?;
//! let descriptor = index.resolve("example.MyMessage")?;
//! let message = ProtobufDecoder::new(&index).decode(&descriptor, &message_bytes)?;
//! let json = JsonProjector::new(&index).to_string(&descriptor, &message)?;
//! println!("{json}");
//! # Ok(())
//! # }
//! ```

use std::io;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Number, Serializer, Value as JsonValue};
use tracing::trace;

use super::wkt;
use crate::core::{CodecError, DynamicMessage, Field, MapValue, Result, Value};
use crate::encoding::protobuf::DecodeOptions;
use crate::schema::{Cardinality, DescriptorIndex, FieldDescriptor, Kind, MapEntry, MessageDescriptor};

const NULL_VALUE_ENUM: &str = "google.protobuf.NullValue";

/// Largest integer a double holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Options for JSON rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Indent output over multiple lines
    pub multiline: bool,

    /// Use declared field names instead of lowerCamelCase names
    pub use_proto_names: bool,

    /// Render enum values as numbers
    pub use_enum_numbers: bool,

    /// Sort map entries by key instead of first-seen order
    pub sort_map_keys: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            multiline: true,
            use_proto_names: false,
            use_enum_numbers: false,
            sort_map_keys: false,
        }
    }
}

impl JsonOptions {
    /// Set multi-line output.
    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Key fields by their declared names.
    pub fn with_proto_names(mut self, enabled: bool) -> Self {
        self.use_proto_names = enabled;
        self
    }

    /// Render enums as numbers.
    pub fn with_enum_numbers(mut self, enabled: bool) -> Self {
        self.use_enum_numbers = enabled;
        self
    }

    /// Sort map entries by key.
    pub fn with_sorted_map_keys(mut self, enabled: bool) -> Self {
        self.sort_map_keys = enabled;
        self
    }
}

/// Projects decoded messages onto canonical JSON.
pub struct JsonProjector<'a> {
    index: &'a DescriptorIndex,
    options: JsonOptions,
    decode_options: DecodeOptions,
}

impl<'a> JsonProjector<'a> {
    /// Create a projector resolving referenced types through `index`.
    pub fn new(index: &'a DescriptorIndex) -> Self {
        Self {
            index,
            options: JsonOptions::default(),
            decode_options: DecodeOptions::default(),
        }
    }

    /// Replace the rendering options.
    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Options used to decode payloads packed in `google.protobuf.Any`.
    ///
    /// The recursion limit also bounds how deep the projector descends,
    /// counting every message level inside and across `Any` payloads.
    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    /// Rendering options in effect.
    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    pub(crate) fn index(&self) -> &'a DescriptorIndex {
        self.index
    }

    pub(crate) fn decode_options(&self) -> DecodeOptions {
        self.decode_options
    }

    /// Error for a descent past the recursion limit.
    pub(crate) fn recursion_limit_error(&self) -> CodecError {
        CodecError::recursion_limit(self.decode_options.recursion_limit)
    }

    /// Project a message onto a JSON value.
    ///
    /// Well-known types render in their special forms; a plain top-level
    /// message always renders as an object.
    pub fn project(
        &self,
        descriptor: &MessageDescriptor,
        message: &DynamicMessage,
    ) -> Result<JsonValue> {
        self.project_within(descriptor, message, self.decode_options.recursion_limit)
    }

    /// Project a message and serialize it.
    ///
    /// Negative zero is written as `-0`.
    pub fn to_string(
        &self,
        descriptor: &MessageDescriptor,
        message: &DynamicMessage,
    ) -> Result<String> {
        let value = self.project(descriptor, message)?;
        let mut out = Vec::new();
        let written = if self.options.multiline {
            let mut serializer =
                Serializer::with_formatter(&mut out, SignedZero(PrettyFormatter::new()));
            value.serialize(&mut serializer)
        } else {
            let mut serializer = Serializer::with_formatter(&mut out, SignedZero(CompactFormatter));
            value.serialize(&mut serializer)
        };
        written.map_err(|e| CodecError::encode("json", e.to_string()))?;
        String::from_utf8(out).map_err(|e| CodecError::encode("json", e.to_string()))
    }

    /// Project a message with `depth` further message levels allowed
    /// below it.
    pub(crate) fn project_within(
        &self,
        descriptor: &MessageDescriptor,
        message: &DynamicMessage,
        depth: u32,
    ) -> Result<JsonValue> {
        if let Some(rendered) = wkt::project_well_known(self, descriptor, message, depth)? {
            return Ok(rendered);
        }
        self.project_fields(descriptor, message, depth)
            .map(JsonValue::Object)
    }

    /// Render the fields of a message as an object, ignoring any
    /// well-known-type form.
    pub(crate) fn project_fields(
        &self,
        descriptor: &MessageDescriptor,
        message: &DynamicMessage,
        depth: u32,
    ) -> Result<Map<String, JsonValue>> {
        let mut object = Map::new();

        for field in descriptor.fields() {
            let Some(value) = message.get(field.number()) else {
                continue;
            };
            let key = if self.options.use_proto_names {
                field.name()
            } else {
                field.json_name()
            };
            if let Some(rendered) = self.render_field(field, value, depth)? {
                object.insert(key.to_string(), rendered);
            }
        }

        let skipped = message
            .iter()
            .filter(|f| matches!(f, Field::Unknown(_)))
            .count();
        if skipped > 0 {
            trace!(
                message = descriptor.full_name(),
                skipped,
                "unknown fields left out of JSON"
            );
        }

        Ok(object)
    }

    fn render_field(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        depth: u32,
    ) -> Result<Option<JsonValue>> {
        let rendered = match (field.cardinality(), value) {
            (Cardinality::Map(entry), Value::Map(entries)) => {
                if entries.is_empty() {
                    return Ok(None);
                }
                self.render_map(entry, entries, depth)?
            }
            (Cardinality::Repeated, Value::List(items)) => {
                if items.is_empty() {
                    return Ok(None);
                }
                let items = items
                    .iter()
                    .map(|item| self.render_value(field.kind(), item, depth))
                    .collect::<Result<Vec<_>>>()?;
                JsonValue::Array(items)
            }
            (Cardinality::Singular, value) => self.render_value(field.kind(), value, depth)?,
            (_, value) => {
                return Err(CodecError::encode(
                    "json",
                    format!(
                        "field '{}' holds {} where its declaration expects otherwise",
                        field.name(),
                        value.type_name()
                    ),
                ))
            }
        };
        Ok(Some(rendered))
    }

    fn render_map(&self, entry: &MapEntry, entries: &MapValue, depth: u32) -> Result<JsonValue> {
        let mut pairs: Vec<_> = entries.iter().collect();
        if self.options.sort_map_keys {
            pairs.sort_by(|a, b| a.0.cmp(b.0));
        }

        let mut object = Map::new();
        for (key, value) in pairs {
            object.insert(key.to_string(), self.render_value(&entry.value, value, depth)?);
        }
        Ok(JsonValue::Object(object))
    }

    /// Render one scalar, enum or message value of the given kind.
    pub(crate) fn render_value(&self, kind: &Kind, value: &Value, depth: u32) -> Result<JsonValue> {
        let rendered = match value {
            Value::Bool(v) => JsonValue::Bool(*v),
            Value::I32(v) => JsonValue::from(*v),
            Value::U32(v) => JsonValue::from(*v),
            Value::I64(v) => JsonValue::String(v.to_string()),
            Value::U64(v) => JsonValue::String(v.to_string()),
            Value::F32(v) => float32_to_json(*v),
            Value::F64(v) => float64_to_json(*v),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => JsonValue::String(STANDARD.encode(b)),
            Value::EnumNumber(number) => self.render_enum(kind, *number)?,
            Value::Message(message) => {
                if depth == 0 {
                    return Err(self.recursion_limit_error());
                }
                let type_name = kind.type_name().unwrap_or_else(|| message.type_name());
                let descriptor = self.index.resolve(type_name)?;
                self.project_within(&descriptor, message, depth - 1)?
            }
            Value::List(_) | Value::Map(_) => {
                return Err(CodecError::encode(
                    "json",
                    format!("nested {} inside a {} value", value.type_name(), kind),
                ))
            }
        };
        Ok(rendered)
    }

    fn render_enum(&self, kind: &Kind, number: i32) -> Result<JsonValue> {
        let Kind::Enum(type_name) = kind else {
            return Ok(JsonValue::from(number));
        };
        if type_name == NULL_VALUE_ENUM {
            return Ok(JsonValue::Null);
        }
        if self.options.use_enum_numbers {
            return Ok(JsonValue::from(number));
        }

        let descriptor = self.index.resolve_enum(type_name)?;
        Ok(match descriptor.value_by_number(number) {
            Some(value) => JsonValue::String(value.name.clone()),
            None => JsonValue::from(number),
        })
    }
}

/// Render a double, spelling out non-finite values.
pub fn float64_to_json(value: f64) -> JsonValue {
    if value.is_nan() {
        return JsonValue::String("NaN".to_string());
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return JsonValue::String(text.to_string());
    }
    // -0.0 keeps its sign, see `SignedZero`
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER && value.to_bits() != (-0.0f64).to_bits()
    {
        return JsonValue::from(value as i64);
    }
    Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

/// JSON writer printing negative zero as `-0` rather than `-0.0`.
struct SignedZero<F>(F);

impl<F: Formatter> Formatter for SignedZero<F> {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        if value == 0.0 && value.is_sign_negative() {
            return writer.write_all(b"-0");
        }
        self.0.write_f64(writer, value)
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}

/// Render a float from its shortest 32-bit representation.
pub fn float32_to_json(value: f32) -> JsonValue {
    if !value.is_finite() {
        return float64_to_json(f64::from(value));
    }
    let widened = value
        .to_string()
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(value));
    float64_to_json(widened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let options = JsonOptions::default();
        assert!(options.multiline);
        assert!(!options.use_proto_names);
        assert!(!options.use_enum_numbers);
        assert!(!options.sort_map_keys);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: JsonOptions = serde_json::from_str(r#"{"sort_map_keys": true}"#).unwrap();
        assert!(options.sort_map_keys);
        assert!(options.multiline);
    }

    #[test]
    fn test_float64_rendering() {
        assert_eq!(float64_to_json(1.5), json!(1.5));
        assert_eq!(float64_to_json(3.0), json!(3));
        assert_eq!(float64_to_json(f64::NAN), json!("NaN"));
        assert_eq!(float64_to_json(f64::INFINITY), json!("Infinity"));
        assert_eq!(float64_to_json(f64::NEG_INFINITY), json!("-Infinity"));
        assert!(float64_to_json(-0.0).as_f64().is_some_and(f64::is_sign_negative));
    }

    fn write_compact(value: &JsonValue) -> String {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, SignedZero(CompactFormatter));
        value.serialize(&mut serializer).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_negative_zero_written_without_fraction() {
        let value = json!({"a": float64_to_json(-0.0), "b": [float64_to_json(0.0), 1.5]});
        assert_eq!(write_compact(&value), r#"{"a":-0,"b":[0,1.5]}"#);
    }

    #[test]
    fn test_pretty_writer_keeps_layout() {
        let value = json!({"a": [1, -0.0], "b": {}});
        let mut out = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut out, SignedZero(PrettyFormatter::new()));
        value.serialize(&mut serializer).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            serde_json::to_string_pretty(&value).unwrap().replace("-0.0", "-0")
        );
    }

    #[test]
    fn test_float32_uses_shortest_representation() {
        assert_eq!(float32_to_json(0.1), json!(0.1));
        assert_eq!(float32_to_json(2.0), json!(2));
        assert_eq!(float32_to_json(f32::NAN), json!("NaN"));
    }

    #[test]
    fn test_large_integral_double_stays_float() {
        let rendered = float64_to_json(1e300);
        assert!(rendered.is_f64());
    }
}
