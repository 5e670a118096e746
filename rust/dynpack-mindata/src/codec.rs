use dynpack_common::{
    Result,
    approach::Approach,
    error::{Error, ErrorKind},
    value::Packable,
    verify_data,
};

use crate::kind::PrimitiveKind;

/// Tag written for a nil value.
pub const NIL_TAG: u8 = 0;

/// Version of the MinData format.
///
/// Every breaking change to the encoding adds a new variant, so that data written by
/// an existing version stays readable by that version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum MinDataVersion {
    #[default]
    V1 = 1,
}

impl MinDataVersion {
    pub const fn number(self) -> i8 {
        self as i8
    }
}

impl TryFrom<i8> for MinDataVersion {
    type Error = Error;

    fn try_from(version: i8) -> Result<Self> {
        match version {
            1 => Ok(MinDataVersion::V1),
            other => Err(Error::unsupported_version("MinDataVersion", other.into())),
        }
    }
}

/// Minimal-overhead approach for whitelisted primitive values.
///
/// The encoding is one [`PrimitiveKind`] tag byte followed by the generic binary
/// encoding of the value; nil is the single byte [`NIL_TAG`]. Values of any other
/// type are rejected with [`ErrorKind::UnsupportedType`].
#[derive(Debug, Clone)]
pub struct MinData {
    name: String,
    version: MinDataVersion,
}

impl MinData {
    /// Creates the current default version of MinData.
    pub fn new() -> MinData {
        MinData::with_version(MinDataVersion::default())
    }

    pub fn with_version(version: MinDataVersion) -> MinData {
        MinData {
            name: format!("MinData{}", version.number()),
            version,
        }
    }

    pub fn version(&self) -> MinDataVersion {
        self.version
    }
}

impl Default for MinData {
    fn default() -> Self {
        MinData::new()
    }
}

impl Approach for MinData {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_serialisable(&self, value: Option<&dyn Packable>) -> bool {
        self.pack(value).is_ok()
    }

    fn pack(&self, value: Option<&dyn Packable>) -> Result<Vec<u8>> {
        let Some(value) = value else {
            return Ok(vec![NIL_TAG]);
        };
        let kind = PrimitiveKind::of(value.as_any())
            .ok_or_else(|| Error::unsupported_type(value.packed_type_name()))?;
        let body = value.to_binary()?;
        let mut buf = Vec::with_capacity(body.len() + 1);
        buf.push(kind.tag());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    fn unpack(&self, data: &[u8]) -> Result<Option<Box<dyn Packable>>> {
        let Some((&tag, body)) = data.split_first() else {
            return Err(ErrorKind::NoData.into());
        };
        if tag == NIL_TAG {
            verify_data!(body, body.is_empty());
            return Ok(None);
        }
        let kind = PrimitiveKind::from_tag(tag).ok_or_else(|| {
            Error::invalid_format(self.name.as_str(), format!("unknown primitive tag {tag}"))
        })?;
        log::trace!("{}: unpacking {kind:?} ({} bytes)", self.name, body.len());
        kind.decode(body).map(Some)
    }
}
