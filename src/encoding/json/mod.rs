// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON output module.
//!
//! Projects decoded messages onto the canonical protobuf JSON mapping.

pub mod projector;
mod wkt;

pub use projector::{float32_to_json, float64_to_json, JsonOptions, JsonProjector};
