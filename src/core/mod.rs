// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout proto2json.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error handling for every pipeline stage
//! - [`DynamicMessage`] - Schema-shaped value tree produced by decoding

pub mod error;
pub mod value;

pub use error::{CodecError, ErrorKind, Result};
pub use value::{DynamicMessage, Field, MapKey, MapValue, UnknownField, Value};
