//! Per-field wire-layout metadata.
//!
//! Every schema field may carry a small set of tags written as string
//! pairs, for example `[hex = "uint64"]` or `[bitmask = "start", bits = "0x0f"]`.
//! [`TagSet::parse`] turns those pairs into typed accessors. A tag that was
//! not declared is absent.
//!
//! | tag          | values                                   |
//! |--------------|------------------------------------------|
//! | `hex`        | `uint8`..`uint64` or `1`/`2`/`4`/`8`     |
//! | `len`        | `uint8`/`uint16`/`uint32` or `1`/`2`/`4` |
//! | `bitmask`    | `start`, `middle`, `end`                 |
//! | `bits`       | `0x…`, `0b…` or decimal mask             |
//! | `endianness` | `le` (default) or `be`                   |
//! | `bound`      | byte count `1`..`8` or `uint24` style    |
//! | `cond`       | `field==N`, `field!=N`, `uint:field==N`  |

use crate::error::ConfigurationError;

/// Width of an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Width {
    /// One byte.
    U8 = 1,
    /// Two bytes.
    U16 = 2,
    /// Four bytes.
    U32 = 4,
    /// Eight bytes.
    U64 = 8,
}

impl Width {
    /// Returns the width in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Returns the largest value representable at this width.
    #[must_use]
    pub const fn max_value(self) -> u64 {
        max_for_bytes(self.bytes())
    }

    /// Converts a byte count into a width.
    #[must_use]
    pub const fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(Self::U8),
            2 => Some(Self::U16),
            4 => Some(Self::U32),
            8 => Some(Self::U64),
            _ => None,
        }
    }

    /// Parses `uint16` or `2` style width names.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        parse_byte_count(value).and_then(Self::from_bytes)
    }

    /// Renders `value` as `0x` followed by zero-padded lowercase hex digits.
    #[must_use]
    pub fn render_hex(self, value: u64) -> String {
        let bytes = value.to_be_bytes();
        format!("0x{}", hex::encode(&bytes[bytes.len() - self.bytes()..]))
    }

    /// Parses a `0x`-prefixed hex string that fits in this width.
    #[must_use]
    pub fn parse_hex(self, text: &str) -> Option<u64> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(digits, 16)
            .ok()
            .filter(|value| *value <= self.max_value())
    }
}

/// Returns the largest value that fits in `bytes` bytes.
pub(crate) const fn max_for_bytes(bytes: usize) -> u64 {
    if bytes >= 8 {
        u64::MAX
    } else {
        (1u64 << (bytes * 8)) - 1
    }
}

/// Byte order of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Position of a field inside a bit-mask run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunRole {
    /// Opens the run; the container is read here.
    Start,
    /// Shares the container opened by an earlier field.
    Middle,
    /// Closes the run; the container is written here.
    End,
}

impl RunRole {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "middle" => Some(Self::Middle),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

/// Mask and role of a field packed into a shared word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitMask {
    mask: u64,
    role: RunRole,
}

impl BitMask {
    /// Returns the mask.
    #[must_use]
    pub const fn mask(self) -> u64 {
        self.mask
    }

    /// Returns the run role.
    #[must_use]
    pub const fn role(self) -> RunRole {
        self.role
    }

    /// Returns the position of the lowest set bit of the mask.
    #[must_use]
    pub const fn shift(self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// Places `value` into its bits of `container`.
    #[must_use]
    pub const fn insert(self, container: u64, value: u64) -> u64 {
        container | ((value << self.shift()) & self.mask)
    }

    /// Extracts this field's right-justified value from `container`.
    #[must_use]
    pub const fn extract(self, container: u64) -> u64 {
        (container & self.mask) >> self.shift()
    }
}

/// Comparison used by a presence condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOp {
    /// Present when the sibling equals the value.
    Eq,
    /// Present when the sibling differs from the value.
    Ne,
}

/// Presence test against an earlier sibling field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    target: &'static str,
    op: ConditionOp,
    value: u64,
    index: usize,
}

impl Condition {
    fn parse(text: &'static str) -> Option<Self> {
        let expr = text.strip_prefix("uint:").unwrap_or(text);
        let (target, op, value) = if let Some((l, r)) = expr.split_once("==") {
            (l, ConditionOp::Eq, r)
        } else if let Some((l, r)) = expr.split_once("!=") {
            (l, ConditionOp::Ne, r)
        } else {
            return None;
        };
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        Some(Self {
            target,
            op,
            value: parse_number(value.trim())?,
            index: 0,
        })
    }

    /// Returns the name of the sibling field tested.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Returns the comparison.
    #[must_use]
    pub const fn op(&self) -> ConditionOp {
        self.op
    }

    /// Returns the value compared against.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Returns the declaration index of the sibling field.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    pub(crate) const fn resolved(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Evaluates the condition against the sibling's current value.
    #[must_use]
    pub const fn holds(&self, actual: u64) -> bool {
        match self.op {
            ConditionOp::Eq => actual == self.value,
            ConditionOp::Ne => actual != self.value,
        }
    }
}

/// Parsed tags of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagSet {
    field: &'static str,
    hex: Option<Width>,
    length: Option<Width>,
    bitmask: Option<BitMask>,
    endianness: Endianness,
    bound: Option<usize>,
    condition: Option<Condition>,
}

impl TagSet {
    /// Creates an empty tag set for the named field.
    #[must_use]
    pub const fn root(field: &'static str) -> Self {
        Self {
            field,
            hex: None,
            length: None,
            bitmask: None,
            endianness: Endianness::Little,
            bound: None,
            condition: None,
        }
    }

    /// Parses the raw `(tag, value)` pairs declared on `record.field`.
    pub fn parse(
        record: &'static str,
        field: &'static str,
        raw: &[(&'static str, &'static str)],
    ) -> Result<Self, ConfigurationError> {
        let mut tags = Self::root(field);
        let mut role = None;
        let mut mask = None;

        let invalid = |tag, value| ConfigurationError::InvalidTagValue {
            record,
            field,
            tag,
            value,
        };
        let unsupported = |tag, value| ConfigurationError::UnsupportedWidth {
            record,
            field,
            tag,
            value,
        };

        for &(tag, value) in raw {
            match tag {
                "hex" => {
                    tags.hex = Some(Width::parse(value).ok_or_else(|| unsupported("hex", value))?);
                }
                "len" => {
                    let width = Width::parse(value)
                        .filter(|w| *w != Width::U64)
                        .ok_or_else(|| unsupported("len", value))?;
                    tags.length = Some(width);
                }
                "bitmask" => {
                    role = Some(RunRole::parse(value).ok_or_else(|| invalid("bitmask", value))?);
                }
                "bits" => {
                    let bits = parse_number(value)
                        .filter(|m| *m != 0)
                        .ok_or_else(|| invalid("bits", value))?;
                    mask = Some(bits);
                }
                "endianness" => {
                    tags.endianness = match value {
                        "le" | "little" => Endianness::Little,
                        "be" | "big" => Endianness::Big,
                        _ => return Err(invalid("endianness", value)),
                    };
                }
                "bound" => {
                    let bytes = parse_byte_count(value)
                        .filter(|n| (1..=8).contains(n))
                        .ok_or_else(|| unsupported("bound", value))?;
                    tags.bound = Some(bytes);
                }
                "cond" => {
                    tags.condition =
                        Some(Condition::parse(value).ok_or_else(|| invalid("cond", value))?);
                }
                _ => {
                    return Err(ConfigurationError::UnknownTag { record, field, tag });
                }
            }
        }

        tags.bitmask = match (role, mask) {
            (Some(_), None) => return Err(ConfigurationError::MissingMask { record, field }),
            (role, Some(mask)) => Some(BitMask {
                mask,
                role: role.unwrap_or(RunRole::Middle),
            }),
            (None, None) => None,
        };

        Ok(tags)
    }

    /// Returns the tags applied to each element of a list field.
    ///
    /// The length prefix belongs to the list itself.
    #[must_use]
    pub const fn element(&self) -> Self {
        let mut tags = *self;
        tags.length = None;
        tags
    }

    /// Returns the name of the annotated field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Returns true if the field is a hex-address string.
    #[must_use]
    pub const fn is_hex(&self) -> bool {
        self.hex.is_some()
    }

    /// Returns the integer width backing a hex-address string.
    #[must_use]
    pub const fn hex(&self) -> Option<Width> {
        self.hex
    }

    /// Returns true if the field carries a length prefix.
    #[must_use]
    pub const fn is_length_prefixed(&self) -> bool {
        self.length.is_some()
    }

    /// Returns the width of the length prefix.
    #[must_use]
    pub const fn length(&self) -> Option<Width> {
        self.length
    }

    /// Returns true if the field belongs to a bit-mask run.
    #[must_use]
    pub const fn is_bitmask(&self) -> bool {
        self.bitmask.is_some()
    }

    /// Returns the bit-mask spec.
    #[must_use]
    pub const fn bitmask(&self) -> Option<BitMask> {
        self.bitmask
    }

    /// Returns the byte order.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Returns true if the field is written narrower than its type.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Returns the explicit byte width of a bounded integer.
    #[must_use]
    pub const fn bound(&self) -> Option<usize> {
        self.bound
    }

    /// Returns true if the field's presence depends on a sibling.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// Returns the presence condition.
    #[must_use]
    pub const fn condition(&self) -> Option<Condition> {
        self.condition
    }

    pub(crate) const fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Parses `uint24` or `3` style byte counts.
fn parse_byte_count(value: &str) -> Option<usize> {
    if let Some(bits) = value.strip_prefix("uint") {
        let bits: usize = bits.parse().ok()?;
        return (bits % 8 == 0).then_some(bits / 8);
    }
    value.parse().ok()
}

fn parse_number(value: &str) -> Option<u64> {
    if let Some(digits) = value.strip_prefix("0x") {
        u64::from_str_radix(digits, 16).ok()
    } else if let Some(digits) = value.strip_prefix("0b") {
        u64::from_str_radix(digits, 2).ok()
    } else {
        value.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tags() {
        let tags = TagSet::parse("Rec", "f", &[]).unwrap();
        assert!(!tags.is_hex());
        assert!(!tags.is_length_prefixed());
        assert!(!tags.is_bitmask());
        assert!(!tags.is_bound());
        assert!(!tags.is_conditional());
        assert_eq!(tags.endianness(), Endianness::Little);
    }

    #[test]
    fn test_width_spellings() {
        assert_eq!(Width::parse("uint64"), Some(Width::U64));
        assert_eq!(Width::parse("8"), Some(Width::U64));
        assert_eq!(Width::parse("uint16"), Some(Width::U16));
        assert_eq!(Width::parse("3"), None);
        assert_eq!(Width::parse("uint12"), None);
    }

    #[test]
    fn test_hex_render_and_parse() {
        assert_eq!(Width::U8.render_hex(1), "0x01");
        assert_eq!(Width::U16.render_hex(1), "0x0001");
        assert_eq!(Width::U32.render_hex(1), "0x00000001");
        assert_eq!(Width::U64.render_hex(1), "0x0000000000000001");
        assert_eq!(Width::U16.parse_hex("0xFF00"), Some(0xff00));
        assert_eq!(Width::U16.parse_hex("0x10000"), None);
        assert_eq!(Width::U16.parse_hex("ff00"), None);
        assert_eq!(Width::U16.parse_hex("0x"), None);
        assert_eq!(Width::U16.parse_hex("0x+1"), None);
    }

    #[test]
    fn test_bitmask_extract_insert() {
        let tags =
            TagSet::parse("Rec", "f", &[("bitmask", "end"), ("bits", "0b11110000")]).unwrap();
        let mask = tags.bitmask().unwrap();
        assert_eq!(mask.role(), RunRole::End);
        assert_eq!(mask.shift(), 4);
        assert_eq!(mask.insert(0x0a, 0x5), 0x5a);
        assert_eq!(mask.extract(0x5a), 0x5);
    }

    #[test]
    fn test_bits_without_role_is_middle() {
        let tags = TagSet::parse("Rec", "f", &[("bits", "0x0002")]).unwrap();
        assert_eq!(tags.bitmask().unwrap().role(), RunRole::Middle);
    }

    #[test]
    fn test_role_without_mask_is_rejected() {
        let err = TagSet::parse("Rec", "f", &[("bitmask", "start")]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingMask {
                record: "Rec",
                field: "f"
            }
        );
    }

    #[test]
    fn test_unsupported_hex_width() {
        let err = TagSet::parse("Rec", "f", &[("hex", "uint24")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnsupportedWidth { tag: "hex", .. }
        ));
    }

    #[test]
    fn test_bound_range() {
        let tags = TagSet::parse("Rec", "f", &[("bound", "uint24")]).unwrap();
        assert_eq!(tags.bound(), Some(3));
        assert!(TagSet::parse("Rec", "f", &[("bound", "9")]).is_err());
        assert!(TagSet::parse("Rec", "f", &[("bound", "0")]).is_err());
    }

    #[test]
    fn test_condition_forms() {
        let tags = TagSet::parse("Rec", "f", &[("cond", "uint:mode==3")]).unwrap();
        let cond = tags.condition().unwrap();
        assert_eq!(cond.target(), "mode");
        assert_eq!(cond.op(), ConditionOp::Eq);
        assert!(cond.holds(3));
        assert!(!cond.holds(2));

        let tags = TagSet::parse("Rec", "f", &[("cond", "mode != 0")]).unwrap();
        assert!(tags.condition().unwrap().holds(1));

        assert!(TagSet::parse("Rec", "f", &[("cond", "mode>3")]).is_err());
    }

    #[test]
    fn test_unknown_tag() {
        let err = TagSet::parse("Rec", "f", &[("size", "1")]).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownTag { tag: "size", .. }));
    }

    #[test]
    fn test_element_drops_length() {
        let tags = TagSet::parse("Rec", "f", &[("hex", "2"), ("len", "uint8")]).unwrap();
        let element = tags.element();
        assert!(!element.is_length_prefixed());
        assert_eq!(element.hex(), Some(Width::U16));
    }
}
