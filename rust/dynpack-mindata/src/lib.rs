//! MinData: a compact approach for primitive values.
//!
//! MinData handles a fixed whitelist of primitive types (see [`PrimitiveKind`]):
//! the integer widths, both float widths, `bool`, `String` and `Duration`, their
//! `Box` forms, and `Vec` forms of the numeric ones plus `Vec<String>` and
//! `Vec<Vec<u8>>`. It does not need a type registry, because the one-byte kind tag
//! fully determines the decoded type.
//!
//! Richer approaches delegate their primitive values to MinData.

mod codec;
pub mod kind;

pub use codec::{MinData, MinDataVersion, NIL_TAG};
pub use kind::PrimitiveKind;
