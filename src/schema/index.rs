// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Flat name index over a compiled descriptor set.
//!
//! The descriptor records only expose nested types as children of their
//! enclosing message. [`DescriptorIndex::load`] walks every file once and
//! registers each message and enum, at any depth, under its fully
//! qualified name so that resolving a type is a single map lookup.

use std::collections::HashMap;
use std::sync::Arc;

use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use tracing::debug;

use super::descriptor::{EnumDescriptor, FileDescriptor, Kind, MessageDescriptor};
use crate::core::{CodecError, DynamicMessage, Result, Value};

/// Read-only index of every type in a descriptor set.
///
/// Immutable once built, so it can be shared across threads and used by
/// any number of concurrent decode/project calls.
#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    files: Vec<FileDescriptor>,
    messages: HashMap<String, Arc<MessageDescriptor>>,
    enums: HashMap<String, Arc<EnumDescriptor>>,
    /// Declaring file of every registered type name.
    owners: HashMap<String, String>,
}

impl DescriptorIndex {
    /// Parse a serialized `FileDescriptorSet` and index it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes)?;
        Self::load(set)
    }

    /// Index every file of a descriptor set.
    ///
    /// Fails when two records declare the same fully qualified type name,
    /// or when a field references a type that is not in the set. A file
    /// record repeated byte-for-byte (same name, same contents) is
    /// skipped.
    pub fn load(set: FileDescriptorSet) -> Result<Self> {
        let mut index = DescriptorIndex::default();
        let mut seen: HashMap<String, FileDescriptorProto> = HashMap::new();

        for proto in set.file {
            let name = proto.name().to_string();
            if let Some(previous) = seen.get(&name) {
                if *previous == proto {
                    debug!(file = %name, "skipping repeated identical file descriptor");
                    continue;
                }
            }

            let file = FileDescriptor::from_proto(&proto)?;
            index.register_file(&file)?;
            index.files.push(file);
            seen.insert(name, proto);
        }

        index.validate_references()?;

        debug!(
            files = index.files.len(),
            messages = index.messages.len(),
            enums = index.enums.len(),
            "built descriptor index"
        );

        Ok(index)
    }

    fn register_file(&mut self, file: &FileDescriptor) -> Result<()> {
        for descriptor in file.enums() {
            self.register_enum(descriptor, file.name())?;
        }

        // Explicit work-list: nesting depth is unbounded.
        let mut pending: Vec<Arc<MessageDescriptor>> = file.messages().to_vec();
        while let Some(message) = pending.pop() {
            for descriptor in message.nested_enums() {
                self.register_enum(descriptor, file.name())?;
            }
            pending.extend(message.nested_messages().iter().cloned());
            self.claim(message.full_name(), file.name())?;
            self.messages
                .insert(message.full_name().to_string(), message);
        }

        Ok(())
    }

    fn register_enum(&mut self, descriptor: &Arc<EnumDescriptor>, file_name: &str) -> Result<()> {
        self.claim(descriptor.full_name(), file_name)?;
        self.enums
            .insert(descriptor.full_name().to_string(), Arc::clone(descriptor));
        Ok(())
    }

    fn claim(&mut self, full_name: &str, file_name: &str) -> Result<()> {
        if let Some(first) = self.owners.get(full_name) {
            return Err(CodecError::duplicate_type(full_name, first, file_name));
        }
        self.owners
            .insert(full_name.to_string(), file_name.to_string());
        Ok(())
    }

    fn validate_references(&self) -> Result<()> {
        for message in self.messages.values() {
            for field in message.fields() {
                let missing = match field.kind() {
                    Kind::Message(name) | Kind::Group(name) => !self.messages.contains_key(name),
                    Kind::Enum(name) => !self.enums.contains_key(name),
                    _ => false,
                };
                if missing {
                    return Err(CodecError::invalid_schema(
                        format!("{}.{}", message.full_name(), field.name()),
                        format!("references unknown type '{}'", field.kind()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Resolve a fully qualified message name, e.g. `pkg.Outer.Inner`.
    ///
    /// A leading `.` is accepted.
    pub fn resolve(&self, full_name: &str) -> Result<Arc<MessageDescriptor>> {
        self.get_message(full_name)
            .cloned()
            .ok_or_else(|| CodecError::type_not_found(full_name))
    }

    /// Resolve a fully qualified enum name.
    pub fn resolve_enum(&self, full_name: &str) -> Result<Arc<EnumDescriptor>> {
        self.get_enum(full_name)
            .cloned()
            .ok_or_else(|| CodecError::type_not_found(full_name))
    }

    /// Look up a message without producing an error.
    pub fn get_message(&self, full_name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.messages.get(full_name.trim_start_matches('.'))
    }

    /// Look up an enum without producing an error.
    pub fn get_enum(&self, full_name: &str) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(full_name.trim_start_matches('.'))
    }

    /// Zero value of a field kind.
    ///
    /// Enums default to their first declared value, messages to an empty
    /// message of the referenced type.
    pub fn default_value(&self, kind: &Kind) -> Result<Value> {
        let value = match kind {
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int64 | Kind::SInt64 | Kind::SFixed64 => Value::I64(0),
            Kind::UInt64 | Kind::Fixed64 => Value::U64(0),
            Kind::Int32 | Kind::SInt32 | Kind::SFixed32 => Value::I32(0),
            Kind::UInt32 | Kind::Fixed32 => Value::U32(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum(type_name) => {
                Value::EnumNumber(self.resolve_enum(type_name)?.default_value().number)
            }
            Kind::Message(type_name) | Kind::Group(type_name) => {
                Value::Message(DynamicMessage::new(type_name.as_str()))
            }
        };
        Ok(value)
    }

    /// Loaded files in input order.
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// All message names, sorted.
    pub fn message_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of indexed messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
