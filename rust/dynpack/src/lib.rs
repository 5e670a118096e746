//! Type-directed value packing.
//!
//! [`BincodeApproach`] packs values of arbitrary registered types into self-describing
//! bytes and reconstructs values of the same concrete type from them. Primitive values
//! are delegated to [`MinData`](dynpack_mindata::MinData); structured values are
//! resolved through a [`TypeRegistry`] on the way back.
//!
//! ```
//! use std::sync::Arc;
//!
//! use dynpack::{Approach, ApproachOptions, BincodeApproach, TypeRegistry, impl_type_name};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Reading {
//!     sensor: String,
//!     values: Vec<f64>,
//! }
//!
//! impl_type_name!(Reading => "docs.Reading");
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.add::<Reading>();
//! let approach = BincodeApproach::new(ApproachOptions::default().with_registry(registry));
//!
//! let reading = Reading { sensor: "t-1".into(), values: vec![20.5] };
//! let bytes = approach.pack(Some(&reading)).unwrap();
//! let value = approach.unpack(&bytes).unwrap().unwrap();
//! assert_eq!(value.downcast_ref::<Reading>(), Some(&reading));
//! ```

pub mod approach;
pub mod catalog;
pub mod envelope;
mod timestamp;
pub mod type_registry;

pub use approach::{ApproachOptions, BincodeApproach, BincodeVersion};
pub use dynpack_common::{
    Result,
    approach::Approach,
    error::{Error, ErrorKind},
    impl_type_name,
    value::{Packable, TypeName},
};
pub use envelope::{Category, Envelope};
pub use type_registry::{
    Registrable, TypeDescriptor, TypeRegistry, TypeRegistryOptions, create_instance,
    create_instance_boxed, default_type_registry, register_type, registered_type,
};
