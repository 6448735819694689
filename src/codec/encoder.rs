//! Record-to-bytes encoding.

use bytes::{BufMut, Bytes, BytesMut};

use super::Wire;
use super::layout::Layout;
use super::tags::{Endianness, RunRole, TagSet, Width, max_for_bytes};
use crate::error::{EncodeError, Result};

/// Growable output buffer for one payload.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Creates an empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Returns the number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes the low `width` bytes of `value`.
    pub fn put_uint(&mut self, value: u64, width: usize, endianness: Endianness) {
        match endianness {
            Endianness::Little => self.buf.put_uint_le(value, width),
            Endianness::Big => self.buf.put_uint(value, width),
        }
    }

    /// Writes an integer field, honouring its bound.
    pub fn put_field_uint(&mut self, value: u64, declared: Width, tags: &TagSet) -> Result<()> {
        let width = tags.bound().unwrap_or(declared.bytes());
        if value > max_for_bytes(width) {
            return Err(EncodeError::ValueOverflow {
                field: tags.field(),
                value,
                width,
            }
            .into());
        }
        self.put_uint(value, width, tags.endianness());
        Ok(())
    }

    /// Writes raw bytes.
    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Writes the length prefix declared by `tags`, if any.
    pub fn put_length(&mut self, len: usize, tags: &TagSet) -> Result<()> {
        let Some(width) = tags.length() else {
            return Ok(());
        };
        if len as u64 > width.max_value() {
            return Err(EncodeError::LengthOverflow {
                field: tags.field(),
                len,
                width: width.bytes(),
            }
            .into());
        }
        self.put_uint(len as u64, width.bytes(), tags.endianness());
        Ok(())
    }

    /// Writes a `0x`-prefixed hex string as an integer of `width`.
    pub fn put_hex(&mut self, text: &str, width: Width, tags: &TagSet) -> Result<()> {
        let value = width
            .parse_hex(text)
            .ok_or_else(|| EncodeError::InvalidHex {
                field: tags.field(),
                value: text.to_string(),
                width: width.bytes(),
            })?;
        self.put_uint(value, width.bytes(), tags.endianness());
        Ok(())
    }

    /// Writes every field of a record in declaration order.
    ///
    /// `values` holds the record's fields in the same order as `layout`.
    pub fn record(&mut self, layout: &Layout, values: &[&dyn Wire]) -> Result<()> {
        let mut container = 0u64;

        for (field, value) in layout.fields().iter().zip(values) {
            let tags = field.tags();

            if let Some(condition) = tags.condition() {
                let actual = values
                    .get(condition.index())
                    .and_then(|v| v.as_uint())
                    .unwrap_or_default();
                if !condition.holds(actual) {
                    continue;
                }
            }

            if let Some(mask) = tags.bitmask() {
                if mask.role() == RunRole::Start {
                    container = 0;
                }
                container = mask.insert(container, value.as_uint().unwrap_or_default());
                if mask.role() == RunRole::End {
                    let width = field.run_width().map_or(1, Width::bytes);
                    self.put_uint(container, width, field.run_endianness());
                }
                continue;
            }

            value.encode(self, tags)?;
        }

        Ok(())
    }
}
