// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Special JSON forms of the `google.protobuf` well-known types.
//!
//! These types are read by field number, so any message declared under
//! one of the well-known names is expected to carry the standard layout.

use serde_json::{Map, Value as JsonValue};

use super::projector::{float64_to_json, JsonProjector};
use crate::core::{CodecError, DynamicMessage, Result, Value};
use crate::encoding::protobuf::ProtobufDecoder;
use crate::schema::{to_json_name, MessageDescriptor};

/// 0001-01-01T00:00:00Z
const MIN_TIMESTAMP_SECONDS: i64 = -62_135_596_800;
/// 9999-12-31T23:59:59Z
const MAX_TIMESTAMP_SECONDS: i64 = 253_402_300_799;
/// Roughly 10,000 years.
const MAX_DURATION_SECONDS: i64 = 315_576_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

const WRAPPERS: &[&str] = &[
    "google.protobuf.DoubleValue",
    "google.protobuf.FloatValue",
    "google.protobuf.Int64Value",
    "google.protobuf.UInt64Value",
    "google.protobuf.Int32Value",
    "google.protobuf.UInt32Value",
    "google.protobuf.BoolValue",
    "google.protobuf.StringValue",
    "google.protobuf.BytesValue",
];

/// Render a well-known type in its special form.
///
/// Returns `None` for every other message, including well-known types
/// without a special form such as the descriptor messages. `depth` is the
/// number of message levels still allowed below `message`.
pub(crate) fn project_well_known(
    projector: &JsonProjector<'_>,
    descriptor: &MessageDescriptor,
    message: &DynamicMessage,
    depth: u32,
) -> Result<Option<JsonValue>> {
    if !descriptor.is_well_known() {
        return Ok(None);
    }

    let rendered = match descriptor.full_name() {
        "google.protobuf.Timestamp" => timestamp(message)?,
        "google.protobuf.Duration" => duration(message)?,
        "google.protobuf.Struct" => struct_object(message)?,
        "google.protobuf.Value" => dynamic_value(message)?,
        "google.protobuf.ListValue" => list_value(message)?,
        "google.protobuf.FieldMask" => field_mask(message),
        "google.protobuf.Empty" => JsonValue::Object(Map::new()),
        "google.protobuf.Any" => any(projector, message, depth)?,
        name if WRAPPERS.contains(&name) => wrapper(projector, descriptor, message, depth)?,
        _ => return Ok(None),
    };
    Ok(Some(rendered))
}

fn seconds_and_nanos(message: &DynamicMessage) -> (i64, i64) {
    let seconds = message.get(1).and_then(Value::as_i64).unwrap_or(0);
    let nanos = message.get(2).and_then(Value::as_i64).unwrap_or(0);
    (seconds, nanos)
}

/// Fractional seconds with 0, 3, 6 or 9 digits.
fn format_nanos(nanos: i64) -> String {
    if nanos == 0 {
        String::new()
    } else if nanos % 1_000_000 == 0 {
        format!(".{:03}", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!(".{:06}", nanos / 1_000)
    } else {
        format!(".{nanos:09}")
    }
}

fn timestamp(message: &DynamicMessage) -> Result<JsonValue> {
    let (seconds, nanos) = seconds_and_nanos(message);

    if !(MIN_TIMESTAMP_SECONDS..=MAX_TIMESTAMP_SECONDS).contains(&seconds) {
        return Err(CodecError::encode(
            "json",
            format!("google.protobuf.Timestamp: seconds out of range {seconds}"),
        ));
    }
    if !(0..NANOS_PER_SECOND).contains(&nanos) {
        return Err(CodecError::encode(
            "json",
            format!("google.protobuf.Timestamp: nanos out of range {nanos}"),
        ));
    }

    let datetime = chrono::DateTime::<chrono::Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
        CodecError::encode(
            "json",
            format!("google.protobuf.Timestamp: unrepresentable seconds {seconds}"),
        )
    })?;

    Ok(JsonValue::String(format!(
        "{}{}Z",
        datetime.format("%Y-%m-%dT%H:%M:%S"),
        format_nanos(nanos)
    )))
}

fn duration(message: &DynamicMessage) -> Result<JsonValue> {
    let (seconds, nanos) = seconds_and_nanos(message);

    if !(-MAX_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&seconds) {
        return Err(CodecError::encode(
            "json",
            format!("google.protobuf.Duration: seconds out of range {seconds}"),
        ));
    }
    if nanos <= -NANOS_PER_SECOND || nanos >= NANOS_PER_SECOND {
        return Err(CodecError::encode(
            "json",
            format!("google.protobuf.Duration: nanos out of range {nanos}"),
        ));
    }
    if (seconds > 0 && nanos < 0) || (seconds < 0 && nanos > 0) {
        return Err(CodecError::encode(
            "json",
            format!("google.protobuf.Duration: seconds {seconds} and nanos {nanos} differ in sign"),
        ));
    }

    let sign = if seconds < 0 || nanos < 0 { "-" } else { "" };
    Ok(JsonValue::String(format!(
        "{sign}{}{}s",
        seconds.unsigned_abs(),
        format_nanos(nanos.abs())
    )))
}

fn wrapper(
    projector: &JsonProjector<'_>,
    descriptor: &MessageDescriptor,
    message: &DynamicMessage,
    depth: u32,
) -> Result<JsonValue> {
    let field = descriptor.field_by_number(1).ok_or_else(|| {
        CodecError::invalid_schema(descriptor.full_name(), "wrapper has no value field")
    })?;
    match message.get(1) {
        Some(value) => projector.render_value(field.kind(), value, depth),
        None => {
            let value = projector.index().default_value(field.kind())?;
            projector.render_value(field.kind(), &value, depth)
        }
    }
}

fn struct_object(message: &DynamicMessage) -> Result<JsonValue> {
    let mut object = Map::new();
    if let Some(entries) = message.get(1).and_then(Value::as_map) {
        for (key, value) in entries {
            let rendered = match value.as_message() {
                Some(inner) => dynamic_value(inner)?,
                None => JsonValue::Null,
            };
            object.insert(key.to_string(), rendered);
        }
    }
    Ok(JsonValue::Object(object))
}

fn dynamic_value(message: &DynamicMessage) -> Result<JsonValue> {
    if message.has(1) {
        return Ok(JsonValue::Null);
    }
    if let Some(number) = message.get(2).and_then(Value::as_f64) {
        if !number.is_finite() {
            return Err(CodecError::encode(
                "json",
                format!("google.protobuf.Value: invalid number {number}"),
            ));
        }
        return Ok(float64_to_json(number));
    }
    if let Some(text) = message.get(3).and_then(Value::as_str) {
        return Ok(JsonValue::String(text.to_string()));
    }
    if let Some(flag) = message.get(4).and_then(Value::as_bool) {
        return Ok(JsonValue::Bool(flag));
    }
    if let Some(inner) = message.get(5).and_then(Value::as_message) {
        return struct_object(inner);
    }
    if let Some(inner) = message.get(6).and_then(Value::as_message) {
        return list_value(inner);
    }
    Err(CodecError::encode(
        "json",
        "google.protobuf.Value: none of the oneof fields is set",
    ))
}

fn list_value(message: &DynamicMessage) -> Result<JsonValue> {
    let items = message.get(1).and_then(Value::as_list).unwrap_or_default();
    items
        .iter()
        .map(|item| match item.as_message() {
            Some(inner) => dynamic_value(inner),
            None => Ok(JsonValue::Null),
        })
        .collect::<Result<Vec<_>>>()
        .map(JsonValue::Array)
}

fn field_mask(message: &DynamicMessage) -> JsonValue {
    let paths = message.get(1).and_then(Value::as_list).unwrap_or_default();
    let joined = paths
        .iter()
        .filter_map(Value::as_str)
        .map(|path| {
            path.split('.')
                .map(to_json_name)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect::<Vec<_>>()
        .join(",");
    JsonValue::String(joined)
}

/// The packed message sits one level below the `Any` and is decoded with
/// whatever depth is left, so chains of `Any` share one recursion limit.
fn any(projector: &JsonProjector<'_>, message: &DynamicMessage, depth: u32) -> Result<JsonValue> {
    let type_url = message.get(1).and_then(Value::as_str).unwrap_or_default();
    let payload = message.get(2).and_then(Value::as_bytes).unwrap_or_default();

    if type_url.is_empty() {
        if payload.is_empty() {
            return Ok(JsonValue::Object(Map::new()));
        }
        return Err(CodecError::encode(
            "json",
            "google.protobuf.Any: value set without a type URL",
        ));
    }

    if depth == 0 {
        return Err(projector.recursion_limit_error());
    }
    let depth = depth - 1;

    let type_name = type_url.rsplit('/').next().unwrap_or(type_url);
    let index = projector.index();
    let descriptor = index.get_message(type_name).ok_or_else(|| {
        CodecError::encode(
            "json",
            format!("google.protobuf.Any: unable to resolve '{type_url}'"),
        )
    })?;
    let options = projector.decode_options().with_recursion_limit(depth);
    let inner = ProtobufDecoder::new(index)
        .with_options(options)
        .decode(descriptor, payload)
        .map_err(|err| match err {
            CodecError::RecursionLimit { .. } => projector.recursion_limit_error(),
            other => other,
        })?;

    let mut object = Map::new();
    object.insert("@type".to_string(), JsonValue::String(type_url.to_string()));
    match project_well_known(projector, descriptor, &inner, depth)? {
        Some(special) => {
            object.insert("value".to_string(), special);
        }
        None => object.extend(projector.project_fields(descriptor, &inner, depth)?),
    }
    Ok(JsonValue::Object(object))
}
