// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # proto2json
//!
//! Decode binary protobuf messages into canonical JSON using nothing but a
//! compiled schema and a fully qualified message name. No generated code
//! for the message type is involved.
//!
//! The pipeline has four stages:
//! - **Descriptor index** in [`schema`] flattens every message and enum of
//!   a `FileDescriptorSet` into one name lookup
//! - **Resolver** maps `package.Outer.Inner` to its descriptor
//! - **Decoder** in [`encoding::protobuf`] turns wire bytes into a
//!   [`DynamicMessage`], preserving unknown fields
//! - **Projector** in [`encoding::json`] renders the canonical JSON mapping
//!
//! [`Converter`] runs all of them in one call.
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use proto2json::Converter;
//!
//! let descriptor_set = std::fs::read("schema.pb")?;
//! let message = std::fs::read("message.bin")?;
//!
//! let converter = Converter::from_descriptor_set(&descriptor_set)?;
//! println!("{}", converter.convert_to_string("example.MyMessage", &message)?);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use crate::core::{CodecError, DynamicMessage, ErrorKind, Field, MapKey, Result, UnknownField, Value};

// Schema descriptors and name index
pub mod schema;

pub use schema::{DescriptorIndex, MessageDescriptor};

// Wire decoding and JSON projection
pub mod encoding;

pub use encoding::{DecodeOptions, JsonOptions, JsonProjector, ProtobufDecoder};

// Pipeline facade
pub mod convert;

pub use convert::Converter;
