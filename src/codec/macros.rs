/// Declares a wire record or a caller-chosen variant.
///
/// Records list their fields in wire order. Tags go in brackets after the
/// field type:
///
/// ```
/// znp::schema! {
///     /// Device announcement.
///     pub struct Announce {
///         pub nwk_addr: String [hex = "uint16"],
///         pub ieee_addr: String [hex = "uint64"],
///         pub mode: u8,
///         pub endpoint: u8 [cond = "mode==3"],
///         pub clusters: Vec<u16> [len = "uint8"],
///     }
/// }
///
/// let mut announce = Announce::default();
/// znp::codec::decode(&[0x34, 0x12, 0, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x00], &mut announce).unwrap();
/// assert_eq!(announce.nwk_addr, "0x1234");
/// ```
///
/// A variant picks its layout from whichever alternative the caller stored
/// before decoding:
///
/// ```
/// znp::schema! {
///     pub struct Short { pub addr: String [hex = "uint16"] }
/// }
/// znp::schema! {
///     pub struct Long { pub addr: String [hex = "uint64"] }
/// }
/// znp::schema! {
///     pub enum Address { Short(Short), Long(Long) }
/// }
///
/// let mut addr = Address::Long(Long::default());
/// znp::codec::decode(&[1, 0, 0, 0, 0, 0, 0, 0], &mut addr).unwrap();
/// assert_eq!(addr, Address::Long(Long { addr: "0x0000000000000001".into() }));
/// ```
#[macro_export]
macro_rules! schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $([ $($tag:ident = $value:literal),* $(,)? ])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::codec::Schema for $name {
            fn layout() -> ::std::result::Result<
                &'static $crate::codec::Layout,
                $crate::error::ConfigurationError,
            > {
                static LAYOUT: ::std::sync::OnceLock<
                    ::std::result::Result<$crate::codec::Layout, $crate::error::ConfigurationError>,
                > = ::std::sync::OnceLock::new();
                LAYOUT
                    .get_or_init(|| {
                        $crate::codec::Layout::parse(
                            stringify!($name),
                            &[$(
                                $crate::codec::FieldDecl {
                                    name: stringify!($field),
                                    shape: <$fty as $crate::codec::Wire>::shape(),
                                    tags: &[$($((stringify!($tag), $value)),*)?],
                                }
                            ),*],
                        )
                    })
                    .as_ref()
                    .map_err(::std::clone::Clone::clone)
            }
        }

        impl $crate::codec::Wire for $name {
            fn shape() -> $crate::codec::Shape {
                $crate::codec::Shape::Record
            }

            fn encode(
                &self,
                enc: &mut $crate::codec::Encoder,
                _tags: &$crate::codec::TagSet,
            ) -> $crate::Result<()> {
                let layout = <Self as $crate::codec::Schema>::layout()?;
                enc.record(layout, &[$(&self.$field as &dyn $crate::codec::Wire),*])
            }

            fn decode(
                &mut self,
                dec: &mut $crate::codec::Decoder<'_>,
                _tags: &$crate::codec::TagSet,
            ) -> $crate::Result<()> {
                let layout = <Self as $crate::codec::Schema>::layout()?;
                dec.record(layout, &mut [$(&mut self.$field as &mut dyn $crate::codec::Wire),*])
            }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident($first_ty:ty)
            $(, $(#[$vmeta:meta])* $variant:ident($vty:ty))* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $name {
            $(#[$first_meta])*
            $first($first_ty),
            $(
                $(#[$vmeta])*
                $variant($vty),
            )*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::$first(::std::default::Default::default())
            }
        }

        impl $crate::codec::Wire for $name {
            fn shape() -> $crate::codec::Shape {
                $crate::codec::Shape::Variant
            }

            fn encode(
                &self,
                enc: &mut $crate::codec::Encoder,
                tags: &$crate::codec::TagSet,
            ) -> $crate::Result<()> {
                match self {
                    Self::$first(inner) => $crate::codec::Wire::encode(inner, enc, tags),
                    $(Self::$variant(inner) => $crate::codec::Wire::encode(inner, enc, tags),)*
                }
            }

            fn decode(
                &mut self,
                dec: &mut $crate::codec::Decoder<'_>,
                tags: &$crate::codec::TagSet,
            ) -> $crate::Result<()> {
                match self {
                    Self::$first(inner) => $crate::codec::Wire::decode(inner, dec, tags),
                    $(Self::$variant(inner) => $crate::codec::Wire::decode(inner, dec, tags),)*
                }
            }
        }
    };
}
