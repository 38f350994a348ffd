// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked reader for the protobuf wire format.
//!
//! Varints go through `prost`'s decoder, fixed-width values are read
//! little-endian with `byteorder`. Positions reported in errors are
//! absolute offsets into the top-level message buffer, also for cursors
//! opened over nested length-delimited payloads.

use byteorder::{ByteOrder, LittleEndian};
use prost::encoding::{decode_varint, WireType};

use crate::core::{CodecError, Result};
use crate::schema::descriptor::MAX_FIELD_NUMBER;

/// Longest valid varint encoding in bytes.
const MAX_VARINT_LEN: usize = 10;

/// Cursor over a protobuf-encoded byte slice.
#[derive(Debug, Clone)]
pub struct WireCursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Absolute offset of `data[0]` in the outermost buffer.
    base: usize,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /// Absolute position of the next unread byte.
    pub fn pos(&self) -> usize {
        self.base + self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check whether all bytes were consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes read since the absolute position `start`.
    pub fn bytes_since(&self, start: usize) -> &'a [u8] {
        let start = start.saturating_sub(self.base).min(self.pos);
        &self.data[start..self.pos]
    }

    /// Read a base-128 varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut buf = &self.data[self.pos..];
        let available = buf.len();

        match decode_varint(&mut buf) {
            Ok(value) => {
                self.pos += available - buf.len();
                Ok(value)
            }
            Err(err) => {
                let unread = &self.data[self.pos..];
                let truncated = unread.len() < MAX_VARINT_LEN
                    && unread.iter().all(|byte| byte & 0x80 != 0);
                if truncated {
                    Err(CodecError::buffer_too_short(
                        unread.len() + 1,
                        unread.len(),
                        self.pos() as u64,
                    ))
                } else {
                    Err(CodecError::field_decode(
                        "<varint>",
                        "varint",
                        self.pos() as u64,
                        err.to_string(),
                    ))
                }
            }
        }
    }

    /// Read a field key and split it into field number and wire type.
    pub fn read_key(&mut self) -> Result<(u32, WireType)> {
        let start = self.pos() as u64;
        let key = self.read_varint()?;

        let wire_type = WireType::try_from(key & 0x07).map_err(|err| {
            CodecError::field_decode("<key>", "tag", start, err.to_string())
        })?;
        let number = u32::try_from(key >> 3)
            .ok()
            .filter(|&n| n > 0 && n <= MAX_FIELD_NUMBER)
            .ok_or_else(|| {
                CodecError::field_decode(
                    "<key>",
                    "tag",
                    start,
                    format!("invalid field number {}", key >> 3),
                )
            })?;

        Ok((number, wire_type))
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::buffer_too_short(
                len,
                self.remaining(),
                self.pos() as u64,
            ));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a little-endian 32-bit value.
    pub fn read_fixed32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Read a little-endian 64-bit value.
    pub fn read_fixed64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    /// Read a length prefix and the payload it announces.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        if len > self.remaining() {
            return Err(CodecError::length_exceeded(
                len,
                self.pos(),
                self.base + self.data.len(),
            ));
        }
        self.take(len)
    }

    /// Read a length-delimited payload as a cursor of its own.
    pub fn read_nested(&mut self) -> Result<WireCursor<'a>> {
        let payload = self.read_length_delimited()?;
        Ok(WireCursor {
            data: payload,
            pos: 0,
            base: self.pos() - payload.len(),
        })
    }

    /// Skip over a value whose key was already read.
    ///
    /// Groups are skipped up to their matching end-group tag, nesting at
    /// most `depth` levels.
    pub fn skip_value(&mut self, number: u32, wire_type: WireType, depth: u32) -> Result<()> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::SixtyFourBit => self.take(8).map(|_| ()),
            WireType::ThirtyTwoBit => self.take(4).map(|_| ()),
            WireType::LengthDelimited => self.read_length_delimited().map(|_| ()),
            WireType::StartGroup => self.skip_group(number, depth),
            WireType::EndGroup => Err(CodecError::field_decode(
                number.to_string(),
                "group",
                self.pos() as u64,
                "end-group tag without matching start-group",
            )),
        }
    }

    fn skip_group(&mut self, number: u32, depth: u32) -> Result<()> {
        if depth == 0 {
            return Err(CodecError::field_decode(
                number.to_string(),
                "group",
                self.pos() as u64,
                "groups nested too deeply",
            ));
        }
        loop {
            if self.is_empty() {
                return Err(CodecError::field_decode(
                    number.to_string(),
                    "group",
                    self.pos() as u64,
                    "unterminated group",
                ));
            }
            let (inner, wire_type) = self.read_key()?;
            if wire_type == WireType::EndGroup {
                if inner == number {
                    return Ok(());
                }
                return Err(CodecError::field_decode(
                    number.to_string(),
                    "group",
                    self.pos() as u64,
                    format!("group ended by tag for field {inner}"),
                ));
            }
            self.skip_value(inner, wire_type, depth - 1)?;
        }
    }
}

/// Decode a zigzag-encoded 32-bit value.
pub fn decode_zigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Decode a zigzag-encoded 64-bit value.
pub fn decode_zigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
