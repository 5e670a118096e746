//! Generic binary encoding of structured values.
//!
//! Thin wrapper over `bincode` (serde mode) pinned to a single configuration:
//! standard encoding with fixed-width little-endian integers. All approaches share
//! this configuration, so it is part of the wire format and must not change within
//! a format version.
//!
//! Decoding is bounded: a length prefix may not claim more memory than a budget
//! derived from the input size (see [`MAX_DECODE_BYTES`]), so malformed input is
//! reported as an error instead of triggering a huge allocation.

use bincode::config::{Configuration, Fixint, LittleEndian};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, error::Error};

/// Upper bound on the memory a single decode may claim, regardless of input size.
pub const MAX_DECODE_BYTES: usize = 1 << 30;

/// Claimed memory allowed per input byte before the next limit tier applies.
const DECODE_BUDGET_FACTOR: usize = 16;

/// Returns the bincode configuration used for every generic binary encoding.
pub fn config() -> Configuration<LittleEndian, Fixint> {
    bincode::config::standard().with_fixed_int_encoding()
}

/// Runs `$decode` with `$config` bound to [`config`] plus the smallest limit tier
/// covering `DECODE_BUDGET_FACTOR` times the input length.
macro_rules! with_decode_limit {
    ($len:expr, |$config:ident| $decode:expr) => {{
        let budget = ($len).saturating_mul(DECODE_BUDGET_FACTOR);
        if budget <= 1 << 12 {
            let $config = config().with_limit::<{ 1 << 12 }>();
            $decode
        } else if budget <= 1 << 16 {
            let $config = config().with_limit::<{ 1 << 16 }>();
            $decode
        } else if budget <= 1 << 20 {
            let $config = config().with_limit::<{ 1 << 20 }>();
            $decode
        } else if budget <= 1 << 24 {
            let $config = config().with_limit::<{ 1 << 24 }>();
            $decode
        } else {
            let $config = config().with_limit::<MAX_DECODE_BYTES>();
            $decode
        }
    }};
}

/// Encodes `value` with the generic binary encoding.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    bincode::serde::encode_to_vec(value, config())
        .map_err(|e| Error::encode(std::any::type_name::<T>(), e))
}

/// Decodes a value of type `T` from `bytes`.
///
/// The whole slice must be consumed; trailing bytes are reported as
/// [`ErrorKind::InvalidFormat`](crate::error::ErrorKind::InvalidFormat).
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let decoded = with_decode_limit!(bytes.len(), |limited| {
        bincode::serde::decode_from_slice::<T, _>(bytes, limited)
    });
    let (value, consumed) = decoded.map_err(|e| Error::decode(std::any::type_name::<T>(), e))?;
    ensure_consumed::<T>(bytes, consumed)?;
    Ok(value)
}

/// Encodes a value that implements bincode's native [`bincode::Encode`].
pub fn encode_native<T>(value: &T) -> Result<Vec<u8>>
where
    T: bincode::Encode,
{
    bincode::encode_to_vec(value, config())
        .map_err(|e| Error::encode(std::any::type_name::<T>(), e))
}

/// Decodes a value that implements bincode's native [`bincode::Decode`], requiring
/// the whole slice to be consumed.
pub fn decode_native<T>(bytes: &[u8]) -> Result<T>
where
    T: bincode::Decode<()>,
{
    let decoded = with_decode_limit!(bytes.len(), |limited| {
        bincode::decode_from_slice::<T, _>(bytes, limited)
    });
    let (value, consumed) = decoded.map_err(|e| Error::decode(std::any::type_name::<T>(), e))?;
    ensure_consumed::<T>(bytes, consumed)?;
    Ok(value)
}

fn ensure_consumed<T>(bytes: &[u8], consumed: usize) -> Result<()> {
    if consumed != bytes.len() {
        return Err(Error::invalid_format(
            std::any::type_name::<T>(),
            format!("{} trailing bytes", bytes.len() - consumed),
        ));
    }
    Ok(())
}
