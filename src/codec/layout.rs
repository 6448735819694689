//! Validated wire layout of a record type.

use super::Shape;
use super::tags::{Endianness, RunRole, TagSet, Width};
use crate::error::ConfigurationError;

/// Field declaration emitted by [`schema!`](crate::schema).
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field name.
    pub name: &'static str,
    /// Shape of the field's Rust type.
    pub shape: Shape,
    /// Raw `(tag, value)` pairs.
    pub tags: &'static [(&'static str, &'static str)],
}

/// A validated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: &'static str,
    shape: Shape,
    tags: TagSet,
    run_width: Option<Width>,
    run_endianness: Endianness,
}

impl Field {
    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the field's shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the parsed tags.
    #[must_use]
    pub const fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Returns the container width of the bit run this field opens or closes.
    ///
    /// The container is as wide as the integer type of the run's end field.
    #[must_use]
    pub const fn run_width(&self) -> Option<Width> {
        self.run_width
    }

    /// Returns the byte order of the bit run's container.
    ///
    /// Like the width, it is taken from the run's end field.
    #[must_use]
    pub const fn run_endianness(&self) -> Endianness {
        self.run_endianness
    }
}

/// Ordered, validated fields of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    record: &'static str,
    fields: Vec<Field>,
}

struct OpenRun {
    start: usize,
    used: u64,
}

impl Layout {
    /// Parses and validates every field declaration of `record`.
    pub fn parse(record: &'static str, decls: &[FieldDecl]) -> Result<Self, ConfigurationError> {
        let mut fields: Vec<Field> = Vec::with_capacity(decls.len());
        let mut open: Option<OpenRun> = None;

        for (index, decl) in decls.iter().enumerate() {
            let field = decl.name;
            let mut tags = TagSet::parse(record, field, decl.tags)?;
            let base = decl.shape.base();
            let mismatch = |tag| ConfigurationError::TagMismatch { record, field, tag };

            if tags.is_hex() && !matches!(base.element(), Shape::Text) {
                return Err(mismatch("hex"));
            }
            if tags.is_length_prefixed() {
                let dynamic = match base {
                    Shape::Text => !tags.is_hex(),
                    Shape::List(_) => true,
                    _ => false,
                };
                if !dynamic {
                    return Err(mismatch("len"));
                }
            }
            if let Some(bound) = tags.bound() {
                let Shape::Uint(declared) = base else {
                    return Err(mismatch("bound"));
                };
                if tags.is_bitmask() {
                    return Err(mismatch("bound"));
                }
                if bound > declared.bytes() {
                    return Err(ConfigurationError::BoundTooWide {
                        record,
                        field,
                        bound,
                        declared: declared.bytes(),
                    });
                }
            }
            if let Some(condition) = tags.condition() {
                if tags.is_bitmask() {
                    return Err(mismatch("cond"));
                }
                let target = fields
                    .iter()
                    .position(|f| f.name == condition.target())
                    .filter(|&i| matches!(fields[i].shape.base(), Shape::Uint(_)))
                    .ok_or_else(|| ConfigurationError::InvalidCondition {
                        record,
                        field,
                        target: condition.target().to_string(),
                    })?;
                tags = tags.with_condition(condition.resolved(target));
            }

            let mut run_width = None;
            let mut run_endianness = Endianness::Little;
            match (tags.bitmask(), open.as_mut()) {
                (None, Some(run)) => {
                    return Err(ConfigurationError::UnterminatedRun {
                        record,
                        field: fields[run.start].name,
                    });
                }
                (None, None) => {}
                (Some(mask), run) => {
                    let Shape::Uint(width) = base else {
                        return Err(mismatch("bits"));
                    };
                    match (mask.role(), run) {
                        (RunRole::Start, Some(run)) => {
                            return Err(ConfigurationError::UnterminatedRun {
                                record,
                                field: fields[run.start].name,
                            });
                        }
                        (RunRole::Start, None) => {
                            open = Some(OpenRun {
                                start: index,
                                used: mask.mask(),
                            });
                        }
                        (RunRole::Middle | RunRole::End, None) => {
                            return Err(ConfigurationError::OrphanBitField { record, field });
                        }
                        (role, Some(run)) => {
                            if run.used & mask.mask() != 0 {
                                return Err(ConfigurationError::OverlappingMask { record, field });
                            }
                            run.used |= mask.mask();
                            if role == RunRole::End {
                                if run.used & !width.max_value() != 0 {
                                    return Err(ConfigurationError::MaskTooWide {
                                        record,
                                        field,
                                        width: width.bytes(),
                                    });
                                }
                                fields[run.start].run_width = Some(*width);
                                fields[run.start].run_endianness = tags.endianness();
                                run_width = Some(*width);
                                run_endianness = tags.endianness();
                                open = None;
                            }
                        }
                    }
                }
            }

            fields.push(Field {
                name: field,
                shape: decl.shape.clone(),
                tags,
                run_width,
                run_endianness,
            });
        }

        if let Some(run) = open {
            return Err(ConfigurationError::UnterminatedRun {
                record,
                field: fields[run.start].name,
            });
        }

        Ok(Self { record, fields })
    }

    /// Returns the record's type name.
    #[must_use]
    pub const fn record(&self) -> &'static str {
        self.record
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(
        name: &'static str,
        shape: Shape,
        tags: &'static [(&'static str, &'static str)],
    ) -> FieldDecl {
        FieldDecl { name, shape, tags }
    }

    #[test]
    fn test_run_width_comes_from_end_field() {
        let layout = Layout::parse(
            "Mixed",
            &[
                decl(
                    "low",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "start"), ("bits", "0x00ff")],
                ),
                decl(
                    "high",
                    Shape::Uint(Width::U16),
                    &[("bitmask", "end"), ("bits", "0xff00")],
                ),
            ],
        )
        .unwrap();
        assert_eq!(layout.fields()[0].run_width(), Some(Width::U16));
        assert_eq!(layout.fields()[1].run_width(), Some(Width::U16));
    }

    #[test]
    fn test_run_byte_order_comes_from_end_field() {
        let layout = Layout::parse(
            "Mixed",
            &[
                decl(
                    "low",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "start"), ("bits", "0x00ff")],
                ),
                decl(
                    "high",
                    Shape::Uint(Width::U16),
                    &[("bitmask", "end"), ("bits", "0xff00"), ("endianness", "be")],
                ),
            ],
        )
        .unwrap();
        assert_eq!(layout.fields()[0].run_endianness(), Endianness::Big);
        assert_eq!(layout.fields()[1].run_endianness(), Endianness::Big);
    }

    #[test]
    fn test_condition_on_bit_field_rejected() {
        let err = Layout::parse(
            "R",
            &[
                decl("mode", Shape::Uint(Width::U8), &[]),
                decl(
                    "a",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "start"), ("bits", "0x0f"), ("cond", "mode==1")],
                ),
                decl(
                    "b",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "end"), ("bits", "0xf0")],
                ),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::TagMismatch {
                record: "R",
                field: "a",
                tag: "cond"
            }
        );
    }

    #[test]
    fn test_condition_resolves_sibling_index() {
        let layout = Layout::parse(
            "Bind",
            &[
                decl("pad", Shape::Uint(Width::U8), &[]),
                decl("mode", Shape::Uint(Width::U8), &[]),
                decl("ep", Shape::Uint(Width::U8), &[("cond", "mode==3")]),
            ],
        )
        .unwrap();
        assert_eq!(layout.fields()[2].tags().condition().unwrap().index(), 1);
    }

    #[test]
    fn test_unknown_tag() {
        let err = Layout::parse("R", &[decl("a", Shape::Uint(Width::U8), &[("nope", "1")])])
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownTag { .. }));
    }

    #[test]
    fn test_invalid_tag_value() {
        let err = Layout::parse(
            "R",
            &[decl(
                "a",
                Shape::Uint(Width::U8),
                &[("bitmask", "begin"), ("bits", "1")],
            )],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidTagValue { tag: "bitmask", .. }
        ));
    }

    #[test]
    fn test_unsupported_width() {
        let err =
            Layout::parse("R", &[decl("a", Shape::Text, &[("hex", "3")])]).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedWidth { .. }));
    }

    #[test]
    fn test_tag_mismatch() {
        let err = Layout::parse("R", &[decl("a", Shape::Uint(Width::U16), &[("hex", "2")])])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::TagMismatch {
                record: "R",
                field: "a",
                tag: "hex"
            }
        );

        let err = Layout::parse("R", &[decl("a", Shape::Uint(Width::U8), &[("len", "1")])])
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::TagMismatch { tag: "len", .. }));

        let err = Layout::parse("R", &[decl("a", Shape::Text, &[("bits", "0x1")])]).unwrap_err();
        assert!(matches!(err, ConfigurationError::TagMismatch { tag: "bits", .. }));
    }

    #[test]
    fn test_missing_mask() {
        let err = Layout::parse(
            "R",
            &[decl("a", Shape::Uint(Width::U8), &[("bitmask", "start")])],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingMask { .. }));
    }

    #[test]
    fn test_orphan_bit_field() {
        let err = Layout::parse(
            "R",
            &[decl(
                "a",
                Shape::Uint(Width::U8),
                &[("bitmask", "end"), ("bits", "0x1")],
            )],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::OrphanBitField {
                record: "R",
                field: "a"
            }
        );
    }

    #[test]
    fn test_unterminated_run() {
        let err = Layout::parse(
            "R",
            &[
                decl(
                    "a",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "start"), ("bits", "0x1")],
                ),
                decl("b", Shape::Uint(Width::U8), &[("bits", "0x2")]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnterminatedRun {
                record: "R",
                field: "a"
            }
        );

        let err = Layout::parse(
            "R",
            &[
                decl(
                    "a",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "start"), ("bits", "0x1")],
                ),
                decl("b", Shape::Uint(Width::U8), &[]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnterminatedRun { field: "a", .. }));
    }

    #[test]
    fn test_overlapping_mask() {
        let err = Layout::parse(
            "R",
            &[
                decl(
                    "a",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "start"), ("bits", "0x03")],
                ),
                decl(
                    "b",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "end"), ("bits", "0x06")],
                ),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::OverlappingMask { field: "b", .. }));
    }

    #[test]
    fn test_mask_too_wide() {
        let err = Layout::parse(
            "R",
            &[
                decl(
                    "a",
                    Shape::Uint(Width::U16),
                    &[("bitmask", "start"), ("bits", "0x0100")],
                ),
                decl(
                    "b",
                    Shape::Uint(Width::U8),
                    &[("bitmask", "end"), ("bits", "0x01")],
                ),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MaskTooWide {
                record: "R",
                field: "b",
                width: 1
            }
        );
    }

    #[test]
    fn test_bound_too_wide() {
        let err = Layout::parse("R", &[decl("a", Shape::Uint(Width::U16), &[("bound", "3")])])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::BoundTooWide {
                record: "R",
                field: "a",
                bound: 3,
                declared: 2
            }
        );
    }

    #[test]
    fn test_invalid_condition() {
        let err = Layout::parse(
            "R",
            &[
                decl("a", Shape::Uint(Width::U8), &[("cond", "b==1")]),
                decl("b", Shape::Uint(Width::U8), &[]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidCondition {
                record: "R",
                field: "a",
                target: "b".to_string()
            }
        );
    }
}
