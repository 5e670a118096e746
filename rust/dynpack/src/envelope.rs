//! The tagged wrapper written around every value packed by
//! [`BincodeApproach`](crate::BincodeApproach).

use dynpack_common::{
    Result, binary,
    error::{Error, ErrorKind},
};

/// Selects the sub-strategy used for the payload of an [`Envelope`].
///
/// The discriminants are the on-wire tags; `0` is reserved and never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    /// Whitelisted primitive, encoded by the primitive delegate.
    PrimitiveDelegate = 1,
    /// `SystemTime`.
    Time = 2,
    /// `Box<SystemTime>`.
    TimePointer = 3,
    /// Any other value, encoded with the generic binary encoding and stored together
    /// with its canonical type name.
    GenericStructured = 4,
    Nil = 5,
}

impl Category {
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Category {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Category::PrimitiveDelegate),
            2 => Ok(Category::Time),
            3 => Ok(Category::TimePointer),
            4 => Ok(Category::GenericStructured),
            5 => Ok(Category::Nil),
            tag => Err(ErrorKind::UnknownCategory { tag }.into()),
        }
    }
}

/// One encoded value.
///
/// The category is kept as a raw tag so that envelopes written by a newer producer
/// still decode; [`category`](Self::category) reports an unknown tag as
/// [`ErrorKind::UnknownCategory`].
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Envelope {
    tag: u8,
    type_name: String,
    payload: Vec<u8>,
}

impl Envelope {
    pub fn new(category: Category, type_name: impl Into<String>, payload: Vec<u8>) -> Envelope {
        Envelope::from_parts(category.tag(), type_name, payload)
    }

    /// Builds an envelope from a raw category tag, without validation.
    pub fn from_parts(tag: u8, type_name: impl Into<String>, payload: Vec<u8>) -> Envelope {
        Envelope {
            tag,
            type_name: type_name.into(),
            payload,
        }
    }

    pub fn nil() -> Envelope {
        Envelope::new(Category::Nil, String::new(), Vec::new())
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn category(&self) -> Result<Category> {
        Category::try_from(self.tag)
    }

    /// Canonical type name; empty unless the category is
    /// [`Category::GenericStructured`].
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        binary::encode_native(self)
    }

    /// Decodes an envelope. The whole input must be consumed.
    pub fn from_slice(bytes: &[u8]) -> Result<Envelope> {
        binary::decode_native(bytes)
    }
}

#[cfg(test)]
mod tests {
    use dynpack_common::error::ErrorKind;

    use super::{Category, Envelope};

    #[test]
    fn test_category_tags() {
        for category in [
            Category::PrimitiveDelegate,
            Category::Time,
            Category::TimePointer,
            Category::GenericStructured,
            Category::Nil,
        ] {
            assert_eq!(Category::try_from(category.tag()).unwrap(), category);
        }
        for tag in [0u8, 6, 255] {
            let err = Category::try_from(tag).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::UnknownCategory { tag: t } if *t == tag));
        }
    }

    #[test]
    fn test_envelope_layout() {
        let envelope = Envelope::new(Category::GenericStructured, "a.B", vec![9]);
        let bytes = envelope.to_vec().unwrap();
        let mut expected = vec![4u8];
        expected.extend_from_slice(&3u64.to_le_bytes());
        expected.extend_from_slice(b"a.B");
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.push(9);
        assert_eq!(bytes, expected);
        assert_eq!(Envelope::from_slice(&bytes).unwrap(), envelope);
    }

    #[test]
    fn test_unknown_tag_survives_decoding() {
        let bytes = Envelope::from_parts(42, "", vec![1]).to_vec().unwrap();
        let envelope = Envelope::from_slice(&bytes).unwrap();
        assert_eq!(envelope.tag(), 42);
        assert!(matches!(
            envelope.category().unwrap_err().kind(),
            ErrorKind::UnknownCategory { tag: 42 }
        ));
    }

    #[test]
    fn test_malformed_envelope() {
        let mut bytes = Envelope::nil().to_vec().unwrap();
        assert!(Envelope::from_slice(&bytes[..4]).is_err());
        bytes.push(0);
        assert!(matches!(
            Envelope::from_slice(&bytes).unwrap_err().kind(),
            ErrorKind::InvalidFormat { .. }
        ));
    }
}
