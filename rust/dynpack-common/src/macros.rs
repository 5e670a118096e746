/// Implements [`TypeName`](crate::value::TypeName) for a user type.
///
/// - `impl_type_name!(Circle)` names the type after the module it is declared in:
///   a `Circle` declared in `my_crate::shapes` becomes `"shapes.Circle"`.
/// - `impl_type_name!(Circle => "geometry.Circle")` freezes an explicit name. Prefer
///   this form for types whose module may move, since the name is stored on the wire.
///
/// `Box<Circle>`, `Vec<Circle>` and the other wrappers derive their names from this one.
#[macro_export]
macro_rules! impl_type_name {
    ($ty:ty => $name:expr) => {
        impl $crate::value::TypeName for $ty {
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed($name)
            }
        }
    };
    ($ty:ident) => {
        impl $crate::value::TypeName for $ty {
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Owned($crate::value::qualified_name(
                    ::std::module_path!(),
                    ::std::stringify!($ty),
                ))
            }
        }
    };
}
