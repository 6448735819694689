//! Schema-driven binary codec.
//!
//! A record type declared with [`schema!`](crate::schema) describes its own
//! wire layout: fields are written in declaration order, little-endian by
//! default, and per-field tags adjust the encoding (hex-address strings,
//! length prefixes, bit-mask runs, bounded integers and presence
//! conditions). See [`tags`] for the tag vocabulary.
//!
//! Layouts are validated once per type, the first time the type is
//! registered or used, and cached for the life of the process.

mod decoder;
mod encoder;
mod layout;
mod macros;
pub mod tags;
mod wire;

use bytes::Bytes;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use layout::{Field, FieldDecl, Layout};
pub use tags::{BitMask, Condition, ConditionOp, Endianness, RunRole, TagSet, Width};

use crate::error::{ConfigurationError, Result};

/// Structural kind of a field's Rust type, used to validate its tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Unsigned integer of the given width.
    Uint(Width),
    /// UTF-8 or hex-address string.
    Text,
    /// Fixed-length array.
    Array,
    /// Variable-length list of elements.
    List(Box<Shape>),
    /// Nested record.
    Record,
    /// Optional field, allocated on decode.
    Optional(Box<Shape>),
    /// Caller-chosen alternative.
    Variant,
}

impl Shape {
    /// Strips any `Optional` wrapper.
    #[must_use]
    pub fn base(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner.base(),
            other => other,
        }
    }

    /// Returns the element shape of a list, or the shape itself.
    #[must_use]
    pub fn element(&self) -> &Self {
        match self {
            Self::List(inner) => inner.base(),
            other => other,
        }
    }
}

/// A value that can be written to and read from a payload.
///
/// Implemented for unsigned integers, `String`, `Vec<T>`, `[T; N]`,
/// `Option<T>`, `()` and every type declared with [`schema!`](crate::schema).
pub trait Wire {
    /// Returns the structural kind of this type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Appends this value to `enc` using the field's tags.
    fn encode(&self, enc: &mut Encoder, tags: &TagSet) -> Result<()>;

    /// Overwrites this value from `dec` using the field's tags.
    ///
    /// Variants and optionals keep the alternative already stored and decode
    /// into it.
    fn decode(&mut self, dec: &mut Decoder<'_>, tags: &TagSet) -> Result<()>;

    /// Returns the value as an integer, for conditions and bit runs.
    fn as_uint(&self) -> Option<u64> {
        None
    }

    /// Stores an integer extracted from a bit run.
    fn set_uint(&mut self, _value: u64) -> bool {
        false
    }
}

/// A record type with a validated layout.
pub trait Schema: Wire + Default + Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Returns the cached layout, validating it on first use.
    fn layout() -> std::result::Result<&'static Layout, ConfigurationError>;
}

/// Validates the layout of `T` ahead of its first use.
pub fn register<T: Schema>() -> Result<()> {
    T::layout()?;
    Ok(())
}

/// Encodes `value` into a fresh payload.
pub fn encode<T: Wire + ?Sized>(value: &T) -> Result<Bytes> {
    let mut enc = Encoder::new();
    value.encode(&mut enc, &TagSet::root("payload"))?;
    Ok(enc.into_bytes())
}

/// Decodes `payload` into `dest`.
///
/// Trailing bytes after the last field are ignored. Variant and optional
/// fields decode into whatever alternative `dest` already holds.
pub fn decode<T: Wire + ?Sized>(payload: &[u8], dest: &mut T) -> Result<()> {
    let mut dec = Decoder::new(payload);
    dest.decode(&mut dec, &TagSet::root("payload"))
}

/// Decodes `payload` into a default-initialised `T`.
pub fn decode_new<T: Wire + Default>(payload: &[u8]) -> Result<T> {
    let mut value = T::default();
    decode(payload, &mut value)?;
    Ok(value)
}
