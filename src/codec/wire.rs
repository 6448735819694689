//! [`Wire`] implementations for primitive and container types.

use super::tags::{TagSet, Width};
use super::{Decoder, Encoder, Shape, Wire};
use crate::error::{DecodeError, Result};

macro_rules! impl_uint {
    ($($ty:ty => $width:ident),* $(,)?) => {
        $(
            impl Wire for $ty {
                fn shape() -> Shape {
                    Shape::Uint(Width::$width)
                }

                fn encode(&self, enc: &mut Encoder, tags: &TagSet) -> Result<()> {
                    enc.put_field_uint(u64::from(*self), Width::$width, tags)
                }

                fn decode(&mut self, dec: &mut Decoder<'_>, tags: &TagSet) -> Result<()> {
                    *self = dec.get_field_uint(Width::$width, tags)? as $ty;
                    Ok(())
                }

                fn as_uint(&self) -> Option<u64> {
                    Some(u64::from(*self))
                }

                fn set_uint(&mut self, value: u64) -> bool {
                    *self = value as $ty;
                    true
                }
            }
        )*
    };
}

impl_uint! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl Wire for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn encode(&self, enc: &mut Encoder, tags: &TagSet) -> Result<()> {
        if let Some(width) = tags.hex() {
            return enc.put_hex(self, width, tags);
        }
        enc.put_length(self.len(), tags)?;
        enc.put_slice(self.as_bytes());
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder<'_>, tags: &TagSet) -> Result<()> {
        if let Some(width) = tags.hex() {
            let value = dec.get_uint(width.bytes(), tags.endianness())?;
            *self = width.render_hex(value);
            return Ok(());
        }
        let len = dec.get_length(tags)?.unwrap_or(dec.remaining());
        let raw = dec.get_slice(len)?;
        *self = std::str::from_utf8(raw)
            .map_err(|_| DecodeError::InvalidString {
                field: tags.field(),
            })?
            .to_string();
        Ok(())
    }
}

impl<T: Wire + Default> Wire for Vec<T> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn encode(&self, enc: &mut Encoder, tags: &TagSet) -> Result<()> {
        enc.put_length(self.len(), tags)?;
        let element = tags.element();
        for item in self {
            item.encode(enc, &element)?;
        }
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder<'_>, tags: &TagSet) -> Result<()> {
        let element = tags.element();
        self.clear();
        if let Some(count) = dec.get_length(tags)? {
            self.reserve(count.min(dec.remaining()));
            for _ in 0..count {
                let before = dec.remaining();
                let mut item = T::default();
                item.decode(dec, &element)?;
                self.push(item);
                // Elements that occupy no bytes cannot bound the loop.
                if dec.remaining() == before {
                    break;
                }
            }
        } else {
            while !dec.is_empty() {
                let before = dec.remaining();
                let mut item = T::default();
                item.decode(dec, &element)?;
                self.push(item);
                if dec.remaining() == before {
                    break;
                }
            }
        }
        Ok(())
    }
}

impl<T: Wire, const N: usize> Wire for [T; N] {
    fn shape() -> Shape {
        Shape::Array
    }

    fn encode(&self, enc: &mut Encoder, tags: &TagSet) -> Result<()> {
        self.iter().try_for_each(|item| item.encode(enc, tags))
    }

    fn decode(&mut self, dec: &mut Decoder<'_>, tags: &TagSet) -> Result<()> {
        self.iter_mut().try_for_each(|item| item.decode(dec, tags))
    }
}

impl<T: Wire + Default> Wire for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn encode(&self, enc: &mut Encoder, tags: &TagSet) -> Result<()> {
        match self {
            Some(inner) => inner.encode(enc, tags),
            None => Ok(()),
        }
    }

    fn decode(&mut self, dec: &mut Decoder<'_>, tags: &TagSet) -> Result<()> {
        if dec.is_empty() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).decode(dec, tags)
    }

    fn as_uint(&self) -> Option<u64> {
        self.as_ref().and_then(Wire::as_uint)
    }

    fn set_uint(&mut self, value: u64) -> bool {
        self.get_or_insert_with(T::default).set_uint(value)
    }
}

impl Wire for () {
    fn shape() -> Shape {
        Shape::Record
    }

    fn encode(&self, _enc: &mut Encoder, _tags: &TagSet) -> Result<()> {
        Ok(())
    }

    fn decode(&mut self, _dec: &mut Decoder<'_>, _tags: &TagSet) -> Result<()> {
        Ok(())
    }
}
