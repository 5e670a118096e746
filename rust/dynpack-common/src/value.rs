//! Value model shared by all packing approaches.
//!
//! An approach receives values as `&dyn Packable` and hands decoded values back as
//! `Box<dyn Packable>`. Two pieces of information travel with every value:
//!
//! - its **canonical type name**, produced by [`TypeName`]. The name is part of the
//!   wire format: it is stored alongside structured payloads and later used as the
//!   key into a type registry, so it must be identical across processes and builds.
//! - its **generic binary encoding**, produced through `serde` and
//!   [`binary`](crate::binary).
//!
//! # Canonical names
//!
//! | Rust type | canonical name |
//! |---|---|
//! | `i8`, `u64`, `f32`, `bool`, `char`, ... | `"i8"`, `"u64"`, `"f32"`, `"bool"`, `"char"` |
//! | `String` | `"String"` |
//! | `std::time::Duration` | `"Duration"` |
//! | `std::time::SystemTime` | `"SystemTime"` |
//! | `Box<T>` | `"*"` + name of `T` |
//! | `Vec<T>` | `"[]"` + name of `T` |
//! | `Option<T>` | `"?"` + name of `T` |
//! | `[T; N]` | `"[N]"` + name of `T` |
//! | user types | via [`impl_type_name!`](crate::impl_type_name), e.g. `"shapes.Circle"` |

use std::{
    any::Any,
    borrow::Cow,
    time::{Duration, SystemTime},
};

use serde::Serialize;

use crate::Result;

/// Deterministic, frozen name of a type.
///
/// The name is used as a registry key and stored on the wire, so implementations
/// must return the same string for the lifetime of any data encoded with it.
/// Pointer-like wrappers prefix the name of their pointee (`Box<Foo>` is `"*pkg.Foo"`,
/// `Box<Box<Foo>>` is `"**pkg.Foo"`), and `Vec<T>` is prefixed with `"[]"`.
pub trait TypeName {
    fn type_name() -> Cow<'static, str>;
}

/// Builds the canonical name of a user type from the module it is declared in.
///
/// Only the last segment of `module_path` is kept: a type `Circle` declared in
/// `my_crate::geometry::shapes` is named `"shapes.Circle"`.
pub fn qualified_name(module_path: &str, ident: &str) -> String {
    let package = module_path.rsplit("::").next().unwrap_or(module_path);
    format!("{package}.{ident}")
}

macro_rules! impl_builtin_type_name {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl TypeName for $ty {
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }
            }
        )*
    };
}

impl_builtin_type_name! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    bool => "bool",
    char => "char",
    String => "String",
    Duration => "Duration",
    SystemTime => "SystemTime",
}

impl<T: TypeName> TypeName for Box<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("*{}", T::type_name()))
    }
}

impl<T: TypeName> TypeName for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("[]{}", T::type_name()))
    }
}

impl<T: TypeName> TypeName for Option<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("?{}", T::type_name()))
    }
}

impl<T: TypeName, const N: usize> TypeName for [T; N] {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("[{N}]{}", T::type_name()))
    }
}

/// Object-safe view of a value that can be handed to an
/// [`Approach`](crate::approach::Approach).
///
/// Implemented for every `T: TypeName + Serialize + Send + Sync + 'static`; there is
/// no need (and no way) to implement it by hand.
pub trait Packable: Any + Send + Sync {
    /// Canonical name of the concrete type behind this value.
    fn packed_type_name(&self) -> Cow<'static, str>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    /// Generic binary encoding of the concrete value (see [`crate::binary`]).
    fn to_binary(&self) -> Result<Vec<u8>>;
}

impl<T> Packable for T
where
    T: TypeName + Serialize + Send + Sync + 'static,
{
    fn packed_type_name(&self) -> Cow<'static, str> {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn to_binary(&self) -> Result<Vec<u8>> {
        crate::binary::to_vec(self)
    }
}

impl dyn Packable {
    /// Returns `true` if the concrete type of this value is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Converts a boxed value into its concrete type, or `None` if the type differs.
    pub fn downcast<T: Any>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

impl std::fmt::Debug for dyn Packable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packable")
            .field("type_name", &self.packed_type_name())
            .finish_non_exhaustive()
    }
}
