// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire-format module.
//!
//! Provides schema-driven decoding into dynamic messages.

pub mod decoder;
pub mod wire;

pub use decoder::{DecodeOptions, ProtobufDecoder, DEFAULT_RECURSION_LIMIT};
pub use wire::WireCursor;
