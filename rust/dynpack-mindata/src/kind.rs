//! The fixed whitelist of primitive value types.
//!
//! Every whitelisted type has a one-byte tag, which MinData writes in front of the
//! value's binary encoding. Tags are part of the wire format and are never reused.

use std::{any::Any, borrow::Cow, time::Duration};

use dynpack_common::{Result, binary, value::Packable, value::TypeName};

macro_rules! primitive_kinds {
    ($($variant:ident = $tag:literal => $ty:ty),* $(,)?) => {
        /// A whitelisted primitive type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum PrimitiveKind {
            $($variant = $tag,)*
        }

        impl PrimitiveKind {
            /// All whitelisted kinds, in tag order.
            pub const ALL: &'static [PrimitiveKind] = &[$(PrimitiveKind::$variant,)*];

            /// Classifies a value, returning `None` if its type is not whitelisted.
            pub fn of(value: &dyn Any) -> Option<PrimitiveKind> {
                $(
                    if value.is::<$ty>() {
                        return Some(PrimitiveKind::$variant);
                    }
                )*
                None
            }

            pub fn from_tag(tag: u8) -> Option<PrimitiveKind> {
                match tag {
                    $($tag => Some(PrimitiveKind::$variant),)*
                    _ => None,
                }
            }

            /// Canonical name of the Rust type behind this kind.
            pub fn type_name(self) -> Cow<'static, str> {
                match self {
                    $(PrimitiveKind::$variant => <$ty as TypeName>::type_name(),)*
                }
            }

            /// Decodes the binary encoding of a value of this kind.
            pub fn decode(self, bytes: &[u8]) -> Result<Box<dyn Packable>> {
                match self {
                    $(PrimitiveKind::$variant => Ok(Box::new(binary::from_slice::<$ty>(bytes)?)),)*
                }
            }
        }
    };
}

primitive_kinds! {
    I8 = 1 => i8,
    I16 = 2 => i16,
    I32 = 3 => i32,
    I64 = 4 => i64,
    U8 = 5 => u8,
    U16 = 6 => u16,
    U32 = 7 => u32,
    U64 = 8 => u64,
    F32 = 9 => f32,
    F64 = 10 => f64,
    Bool = 11 => bool,
    String = 12 => String,
    Duration = 13 => Duration,

    BoxI8 = 21 => Box<i8>,
    BoxI16 = 22 => Box<i16>,
    BoxI32 = 23 => Box<i32>,
    BoxI64 = 24 => Box<i64>,
    BoxU8 = 25 => Box<u8>,
    BoxU16 = 26 => Box<u16>,
    BoxU32 = 27 => Box<u32>,
    BoxU64 = 28 => Box<u64>,
    BoxF32 = 29 => Box<f32>,
    BoxF64 = 30 => Box<f64>,
    BoxBool = 31 => Box<bool>,
    BoxString = 32 => Box<String>,
    BoxDuration = 33 => Box<Duration>,

    VecI8 = 41 => Vec<i8>,
    VecI16 = 42 => Vec<i16>,
    VecI32 = 43 => Vec<i32>,
    VecI64 = 44 => Vec<i64>,
    Bytes = 45 => Vec<u8>,
    VecU16 = 46 => Vec<u16>,
    VecU32 = 47 => Vec<u32>,
    VecU64 = 48 => Vec<u64>,
    VecF32 = 49 => Vec<f32>,
    VecF64 = 50 => Vec<f64>,
    VecBool = 51 => Vec<bool>,
    VecDuration = 52 => Vec<Duration>,
    VecString = 53 => Vec<String>,
    VecBytes = 54 => Vec<Vec<u8>>,
}

impl PrimitiveKind {
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns `true` if the concrete type of `value` is whitelisted.
    pub fn is_primitive(value: &dyn Packable) -> bool {
        PrimitiveKind::of(value.as_any()).is_some()
    }
}
