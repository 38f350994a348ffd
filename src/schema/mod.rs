// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema handling for compiled `.proto` files.
//!
//! - [`descriptor`] - File, message, field and enum descriptors
//! - [`index`] - Flat fully-qualified-name index and resolver
//! - [`naming`] - JSON field name derivation

pub mod descriptor;
pub mod index;
pub mod naming;

pub use descriptor::{
    Cardinality, EnumDescriptor, EnumValue, FieldDescriptor, FileDescriptor, Kind, MapEntry,
    MessageDescriptor, OneofDescriptor, Syntax,
};
pub use index::DescriptorIndex;
pub use naming::to_json_name;
