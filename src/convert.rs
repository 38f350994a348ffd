// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Resolve, decode and project in one call.
//!
//! [`Converter`] owns the [`DescriptorIndex`] and runs the whole pipeline
//! for one message at a time. A failure in any stage aborts the
//! conversion and no partial JSON is produced.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{DynamicMessage, Result};
use crate::encoding::json::{JsonOptions, JsonProjector};
use crate::encoding::protobuf::{DecodeOptions, ProtobufDecoder};
use crate::schema::{DescriptorIndex, MessageDescriptor};

/// Binary protobuf to JSON converter.
#[derive(Debug, Clone)]
pub struct Converter {
    index: DescriptorIndex,
    decode_options: DecodeOptions,
    json_options: JsonOptions,
}

impl Converter {
    /// Create a converter over an already built index.
    pub fn new(index: DescriptorIndex) -> Self {
        Self {
            index,
            decode_options: DecodeOptions::default(),
            json_options: JsonOptions::default(),
        }
    }

    /// Build the index from a serialized `FileDescriptorSet`.
    pub fn from_descriptor_set(bytes: &[u8]) -> Result<Self> {
        DescriptorIndex::from_bytes(bytes).map(Self::new)
    }

    /// Replace the decode options.
    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    /// Replace the JSON options.
    pub fn with_json_options(mut self, options: JsonOptions) -> Self {
        self.json_options = options;
        self
    }

    /// The index types are resolved against.
    pub fn index(&self) -> &DescriptorIndex {
        &self.index
    }

    /// Decode `data` as `message_name` and project it onto JSON.
    pub fn convert(&self, message_name: &str, data: &[u8]) -> Result<serde_json::Value> {
        let (descriptor, decoded) = self.decode(message_name, data)?;
        let json = self.projector().project(&descriptor, &decoded)?;
        info!(
            message = descriptor.full_name(),
            bytes = data.len(),
            "converted message"
        );
        Ok(json)
    }

    /// Like [`Converter::convert`], rendered as text per the JSON options.
    pub fn convert_to_string(&self, message_name: &str, data: &[u8]) -> Result<String> {
        let (descriptor, decoded) = self.decode(message_name, data)?;
        let text = self.projector().to_string(&descriptor, &decoded)?;
        info!(
            message = descriptor.full_name(),
            bytes = data.len(),
            json_len = text.len(),
            "converted message"
        );
        Ok(text)
    }

    fn decode(
        &self,
        message_name: &str,
        data: &[u8],
    ) -> Result<(Arc<MessageDescriptor>, DynamicMessage)> {
        let descriptor = self.index.resolve(message_name).inspect_err(|e| {
            warn!(message = message_name, error = %e, "message type not resolved");
        })?;
        debug!(
            message = descriptor.full_name(),
            file = descriptor.file_name(),
            "resolved message type"
        );

        let decoded = ProtobufDecoder::new(&self.index)
            .with_options(self.decode_options)
            .decode(&descriptor, data)?;
        Ok((descriptor, decoded))
    }

    fn projector(&self) -> JsonProjector<'_> {
        JsonProjector::new(&self.index)
            .with_options(self.json_options)
            .with_decode_options(self.decode_options)
    }
}
