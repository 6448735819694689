//! Bytes-to-record decoding.

use bytes::Buf;

use super::Wire;
use super::layout::Layout;
use super::tags::{Endianness, RunRole, TagSet, Width};
use crate::error::{DecodeError, Result};

/// Read cursor over one payload.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Creates a decoder positioned at the start of `payload`.
    #[must_use]
    pub const fn new(payload: &'a [u8]) -> Self {
        Self { buf: payload }
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if the payload is exhausted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.len() < needed {
            return Err(DecodeError::UnexpectedEof {
                needed,
                remaining: self.buf.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Reads a `width`-byte unsigned integer.
    pub fn get_uint(&mut self, width: usize, endianness: Endianness) -> Result<u64> {
        self.ensure(width)?;
        Ok(match endianness {
            Endianness::Little => self.buf.get_uint_le(width),
            Endianness::Big => self.buf.get_uint(width),
        })
    }

    /// Reads an integer field, honouring its bound.
    pub fn get_field_uint(&mut self, declared: Width, tags: &TagSet) -> Result<u64> {
        let width = tags.bound().unwrap_or(declared.bytes());
        self.get_uint(width, tags.endianness())
    }

    /// Reads `len` raw bytes.
    pub fn get_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Reads the length prefix declared by `tags`.
    ///
    /// Returns `None` when the field has no prefix and extends to the end of
    /// the payload.
    pub fn get_length(&mut self, tags: &TagSet) -> Result<Option<usize>> {
        tags.length()
            .map(|width| {
                self.get_uint(width.bytes(), tags.endianness())
                    .map(|len| len as usize)
            })
            .transpose()
    }

    /// Reads every field of a record in declaration order.
    ///
    /// `values` holds the record's fields in the same order as `layout`.
    pub fn record(&mut self, layout: &Layout, values: &mut [&mut dyn Wire]) -> Result<()> {
        let mut container = 0u64;

        for (index, field) in layout.fields().iter().enumerate() {
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

            let Some(value) = values.get_mut(index) else {
                break;
            };

            if let Some(mask) = tags.bitmask() {
                if mask.role() == RunRole::Start {
                    let width = field.run_width().map_or(1, Width::bytes);
                    container = self.get_uint(width, field.run_endianness())?;
                }
                value.set_uint(mask.extract(container));
                continue;
            }

            value.decode(self, tags)?;
        }

        Ok(())
    }
}
