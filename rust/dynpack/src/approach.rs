//! The dispatching approach.
//!
//! [`BincodeApproach`] classifies each value by its runtime type, encodes it with the
//! sub-strategy for its [`Category`], and wraps the result in an [`Envelope`]:
//!
//! 1. `None` is [`Category::Nil`] with an empty payload.
//! 2. Whitelisted primitives ([`PrimitiveKind`]) are packed by the primitive delegate.
//!    The check runs before everything else, so `Vec<u8>` is always a primitive.
//! 3. `SystemTime` and `Box<SystemTime>` use the wall-clock codec.
//! 4. Everything else is generic structured data, stored together with its canonical
//!    type name. Unpacking such a value requires the name to be registered in the
//!    [`TypeRegistry`] the approach is bound to.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::SystemTime,
};

use dynpack_common::{
    Result,
    approach::Approach,
    error::{Error, ErrorKind},
    value::Packable,
    verify_data,
};
use dynpack_mindata::{MinData, PrimitiveKind};

use crate::{
    envelope::{Category, Envelope},
    timestamp,
    type_registry::{TypeRegistry, default_type_registry},
};

/// Leading byte of a generic structured payload.
const STRUCTURED_FORMAT_V1: u8 = 1;

/// Generation of the [`BincodeApproach`] wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum BincodeVersion {
    #[default]
    V1 = 1,
}

impl BincodeVersion {
    pub const fn number(self) -> i8 {
        self as i8
    }
}

impl TryFrom<i8> for BincodeVersion {
    type Error = Error;

    fn try_from(version: i8) -> Result<Self> {
        match version {
            1 => Ok(BincodeVersion::V1),
            other => Err(Error::unsupported_version("BincodeVersion", other.into())),
        }
    }
}

/// Construction options of [`BincodeApproach`].
#[derive(Clone, Default)]
pub struct ApproachOptions {
    /// Registry used to resolve structured type names. Defaults to the process-wide
    /// registry.
    pub registry: Option<Arc<TypeRegistry>>,
    /// Approach used for whitelisted primitives. Defaults to [`MinData`].
    pub primitive_delegate: Option<Arc<dyn Approach>>,
}

impl ApproachOptions {
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_primitive_delegate(mut self, delegate: Arc<dyn Approach>) -> Self {
        self.primitive_delegate = Some(delegate);
        self
    }
}

impl fmt::Debug for ApproachOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApproachOptions")
            .field("registry", &self.registry)
            .field(
                "primitive_delegate",
                &self.primitive_delegate.as_ref().map(|d| d.name().to_string()),
            )
            .finish()
    }
}

/// Type-directed approach: dispatches every value to a sub-strategy chosen by its
/// runtime type and records the choice in an [`Envelope`].
pub struct BincodeApproach {
    name: String,
    version: BincodeVersion,
    registry: Arc<TypeRegistry>,
    primitives: Arc<dyn Approach>,
}

impl BincodeApproach {
    /// Creates the current default version of the approach.
    pub fn new(options: ApproachOptions) -> BincodeApproach {
        BincodeApproach::with_version(BincodeVersion::default(), options)
    }

    pub fn with_version(version: BincodeVersion, options: ApproachOptions) -> BincodeApproach {
        let ApproachOptions {
            registry,
            primitive_delegate,
        } = options;
        BincodeApproach {
            name: format!("BINC{}", version.number()),
            version,
            registry: registry.unwrap_or_else(default_type_registry),
            primitives: primitive_delegate
                .unwrap_or_else(|| Arc::new(MinData::new()) as Arc<dyn Approach>),
        }
    }

    pub fn version(&self) -> BincodeVersion {
        self.version
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn primitive_delegate(&self) -> &Arc<dyn Approach> {
        &self.primitives
    }

    /// Returns the category `value` is packed under.
    pub fn classify(value: Option<&dyn Packable>) -> Category {
        let Some(value) = value else {
            return Category::Nil;
        };
        if PrimitiveKind::is_primitive(value) {
            Category::PrimitiveDelegate
        } else if value.is::<SystemTime>() {
            Category::Time
        } else if value.is::<Box<SystemTime>>() {
            Category::TimePointer
        } else {
            Category::GenericStructured
        }
    }

    /// Packs `value` into an envelope without encoding the envelope itself.
    pub fn pack_envelope(&self, value: Option<&dyn Packable>) -> Result<Envelope> {
        let category = Self::classify(value);
        let Some(value) = value else {
            return Ok(Envelope::nil());
        };
        log::trace!(
            "{}: packing {} as {category:?}",
            self.name,
            value.packed_type_name()
        );
        match category {
            Category::Nil => Ok(Envelope::nil()),
            Category::PrimitiveDelegate => Ok(Envelope::new(
                category,
                String::new(),
                self.primitives.pack(Some(value))?,
            )),
            Category::Time | Category::TimePointer => {
                let time = value
                    .downcast_ref::<SystemTime>()
                    .or_else(|| value.downcast_ref::<Box<SystemTime>>().map(|b| &**b))
                    .copied()
                    .ok_or_else(|| Error::unsupported_type(value.packed_type_name()))?;
                Ok(Envelope::new(category, String::new(), timestamp::encode(time)?))
            }
            Category::GenericStructured => {
                let body = value.to_binary()?;
                let mut payload = Vec::with_capacity(body.len() + 1);
                payload.push(STRUCTURED_FORMAT_V1);
                payload.extend_from_slice(&body);
                Ok(Envelope::new(category, value.packed_type_name(), payload))
            }
        }
    }

    /// Reconstructs the value held by a decoded envelope.
    pub fn unpack_envelope(&self, envelope: &Envelope) -> Result<Option<Box<dyn Packable>>> {
        let category = envelope.category()?;
        let payload = envelope.payload();
        log::trace!(
            "{}: unpacking {category:?} ({} bytes)",
            self.name,
            payload.len()
        );
        if category != Category::GenericStructured {
            verify_data!(type_name, envelope.type_name().is_empty());
        }
        match category {
            Category::Nil => {
                verify_data!(payload, payload.is_empty());
                Ok(None)
            }
            _ if payload.is_empty() => Err(ErrorKind::NoDeserialisableData.into()),
            Category::PrimitiveDelegate => self.primitives.unpack(payload),
            Category::Time => {
                let value: Box<dyn Packable> = Box::new(timestamp::decode(payload)?);
                Ok(Some(value))
            }
            Category::TimePointer => {
                let value: Box<dyn Packable> = Box::new(Box::new(timestamp::decode(payload)?));
                Ok(Some(value))
            }
            Category::GenericStructured => self
                .unpack_structured(envelope.type_name(), payload)
                .map(Some),
        }
    }

    fn unpack_structured(&self, type_name: &str, payload: &[u8]) -> Result<Box<dyn Packable>> {
        verify_data!(type_name, !type_name.is_empty());
        let Some((&format, body)) = payload.split_first() else {
            return Err(ErrorKind::NoDeserialisableData.into());
        };
        if format != STRUCTURED_FORMAT_V1 {
            return Err(Error::invalid_format(
                type_name,
                format!("unknown structured format {format}"),
            ));
        }
        self.registry.get_type(type_name)?.decode(body)
    }
}

impl Default for BincodeApproach {
    fn default() -> Self {
        BincodeApproach::new(ApproachOptions::default())
    }
}

impl fmt::Debug for BincodeApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BincodeApproach")
            .field("name", &self.name)
            .field("primitive_delegate", &self.primitives.name())
            .finish_non_exhaustive()
    }
}

impl Approach for BincodeApproach {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_serialisable(&self, value: Option<&dyn Packable>) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| self.pack(value))) {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                log::trace!("{}: value is not serialisable: {e}", self.name);
                false
            }
            Err(_) => {
                log::debug!("{}: packing panicked", self.name);
                false
            }
        }
    }

    fn pack(&self, value: Option<&dyn Packable>) -> Result<Vec<u8>> {
        self.pack_envelope(value)?.to_vec()
    }

    fn unpack(&self, data: &[u8]) -> Result<Option<Box<dyn Packable>>> {
        if data.is_empty() {
            return Err(ErrorKind::NoData.into());
        }
        let envelope = Envelope::from_slice(data)?;
        self.unpack_envelope(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        time::{Duration, SystemTime},
    };

    use dynpack_common::{approach::Approach, error::ErrorKind, value::Packable};
    use serde::{Deserialize, Serialize};

    use super::{ApproachOptions, BincodeApproach, BincodeVersion};
    use crate::{
        envelope::{Category, Envelope},
        type_registry::TypeRegistry,
    };

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    dynpack_common::impl_type_name!(Point);

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Marker;

    dynpack_common::impl_type_name!(Marker);

    fn approach() -> BincodeApproach {
        let registry = Arc::new(TypeRegistry::new());
        registry.add::<Point>();
        registry.add::<Marker>();
        BincodeApproach::new(ApproachOptions::default().with_registry(registry))
    }

    fn category_of(value: &dyn Packable) -> Category {
        BincodeApproach::classify(Some(value))
    }

    #[test]
    fn test_name_and_version() {
        let approach = approach();
        assert_eq!(approach.name(), "BINC1");
        assert_eq!(approach.version(), BincodeVersion::V1);
        assert_eq!(approach.primitive_delegate().name(), "MinData1");
        assert!(matches!(
            BincodeVersion::try_from(0).unwrap_err().kind(),
            ErrorKind::UnsupportedVersion { version: 0, .. }
        ));
        assert_eq!(BincodeVersion::try_from(1).unwrap(), BincodeVersion::V1);
    }

    #[test]
    fn test_classification() {
        assert_eq!(BincodeApproach::classify(None), Category::Nil);
        assert_eq!(category_of(&42i8), Category::PrimitiveDelegate);
        assert_eq!(category_of(&vec![1u8, 2]), Category::PrimitiveDelegate);
        assert_eq!(category_of(&Box::new(1u64)), Category::PrimitiveDelegate);
        assert_eq!(category_of(&Duration::ZERO), Category::PrimitiveDelegate);
        assert_eq!(category_of(&SystemTime::now()), Category::Time);
        assert_eq!(category_of(&Box::new(SystemTime::now())), Category::TimePointer);
        assert_eq!(category_of(&Point::default()), Category::GenericStructured);
        assert_eq!(category_of(&42usize), Category::GenericStructured);
        assert_eq!(category_of(&vec![Point::default()]), Category::GenericStructured);
    }

    #[test]
    fn test_envelope_contents() {
        let approach = approach();
        let envelope = approach
            .pack_envelope(Some(&Point { x: 1, y: 2 }))
            .unwrap();
        assert_eq!(envelope.category().unwrap(), Category::GenericStructured);
        assert_eq!(envelope.type_name(), "tests.Point");
        assert_eq!(envelope.payload()[0], 1);

        let envelope = approach.pack_envelope(Some(&7u32)).unwrap();
        assert_eq!(envelope.category().unwrap(), Category::PrimitiveDelegate);
        assert_eq!(envelope.type_name(), "");
        assert_eq!(envelope.payload(), &[7, 7, 0, 0, 0]);

        assert_eq!(approach.pack_envelope(None).unwrap(), Envelope::nil());
    }

    #[test]
    fn test_zero_sized_value() {
        let approach = approach();
        let bytes = approach.pack(Some(&Marker)).unwrap();
        let value = approach.unpack(&bytes).unwrap().unwrap();
        assert!(value.is::<Marker>());
    }

    #[test]
    fn test_strict_envelopes() {
        let approach = approach();
        let invalid = [
            Envelope::new(Category::Nil, "", vec![1]),
            Envelope::new(Category::Time, "x.Y", vec![1]),
            Envelope::new(Category::GenericStructured, "", vec![1]),
            Envelope::new(Category::GenericStructured, "tests.Point", vec![2, 0]),
        ];
        for envelope in invalid {
            let err = approach.unpack(&envelope.to_vec().unwrap()).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::InvalidFormat { .. }),
                "{envelope:?}: {err}"
            );
        }

        let empty = Envelope::new(Category::PrimitiveDelegate, "", Vec::new());
        assert!(matches!(
            approach.unpack(&empty.to_vec().unwrap()).unwrap_err().kind(),
            ErrorKind::NoDeserialisableData
        ));
        assert!(matches!(
            approach.unpack(&[]).unwrap_err().kind(),
            ErrorKind::NoData
        ));
    }

    #[test]
    fn test_trailing_payload_bytes() {
        let approach = approach();
        let packed = approach.pack_envelope(Some(&Point { x: 3, y: 4 })).unwrap();
        let mut payload = packed.payload().to_vec();
        payload.push(0);
        let envelope = Envelope::new(Category::GenericStructured, packed.type_name(), payload);
        let err = approach.unpack(&envelope.to_vec().unwrap()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }
}
