use crate::{Result, value::Packable};

/// A pluggable packing strategy.
///
/// An approach turns a value into bytes and back. The outer pipeline (compression,
/// encryption, framing) treats the produced bytes as opaque and records
/// [`name`](Self::name) next to them, so that the matching approach can be looked up
/// again when the bytes are read back.
///
/// "Nil" is represented by `None` on both sides: packing `None` must succeed and
/// unpacking the result must yield `None`.
///
/// # Thread Safety
///
/// Approaches are shared across threads via `Arc`, hence the `Send + Sync + 'static`
/// bound. Implementations hold no mutable state of their own.
pub trait Approach: Send + Sync + 'static {
    /// Stable identifier of this approach, including its version (e.g. `"BINC1"`).
    ///
    /// The name is persisted by callers, so it must never change for a given
    /// approach version.
    fn name(&self) -> &str;

    /// Returns `true` if `value` can be packed by this approach.
    ///
    /// This never fails and never panics; any failure of the packing path is
    /// reported as `false`.
    fn is_serialisable(&self, value: Option<&dyn Packable>) -> bool;

    /// Packs `value` into bytes.
    fn pack(&self, value: Option<&dyn Packable>) -> Result<Vec<u8>>;

    /// Unpacks bytes produced by [`pack`](Self::pack) of the same approach.
    fn unpack(&self, data: &[u8]) -> Result<Option<Box<dyn Packable>>>;
}
