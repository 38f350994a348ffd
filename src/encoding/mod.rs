// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoding and rendering.
//!
//! - [`protobuf`] - Schema-driven protobuf wire decoding
//! - [`json`] - Canonical JSON projection

pub mod json;
pub mod protobuf;

pub use json::{JsonOptions, JsonProjector};
pub use protobuf::{DecodeOptions, ProtobufDecoder};
