//! Registry of types that can be reconstructed from their canonical name.
//!
//! Structured values are stored on the wire together with their canonical type name
//! (see [`TypeName`]). To turn such a payload back into a value, the decoder needs a
//! way to go from the name to the concrete Rust type. The [`TypeRegistry`] provides
//! exactly that: a name → [`TypeDescriptor`] table, where each descriptor holds
//! monomorphized constructors and a decoder for one registered type.
//!
//! # Default and private registries
//!
//! A process-wide default registry is created lazily on first use
//! ([`default_type_registry`]). New code should prefer explicitly constructed
//! registries, passed through [`TypeRegistryOptions`] or
//! [`ApproachOptions`](crate::ApproachOptions).
//!
//! # Thread Safety
//!
//! The registry uses a `RwLock`: registration takes the lock exclusively, lookups and
//! instance creation share it. Descriptors are immutable and handed out as `Arc`, so
//! callers never hold the lock while decoding.

use std::{
    any::TypeId,
    fmt,
    sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard},
};

use dynpack_common::{
    Result, binary,
    error::{Error, ErrorKind},
    value::{Packable, TypeName},
};
use serde::{Serialize, de::DeserializeOwned};

/// Types that can be registered and reconstructed by name.
///
/// Blanket-implemented; `Default` provides the zero value returned by
/// [`TypeRegistry::create_instance`].
pub trait Registrable:
    TypeName + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
}

impl<T> Registrable for T where
    T: TypeName + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
}

/// Runtime descriptor of one registered type.
pub struct TypeDescriptor {
    name: String,
    type_id: TypeId,
    rust_type: &'static str,
    new_instance: fn() -> Box<dyn Packable>,
    new_instance_boxed: fn() -> Box<dyn Packable>,
    decode: fn(&[u8]) -> Result<Box<dyn Packable>>,
}

impl TypeDescriptor {
    pub fn of<T: Registrable>() -> TypeDescriptor {
        TypeDescriptor {
            name: T::type_name().into_owned(),
            type_id: TypeId::of::<T>(),
            rust_type: std::any::type_name::<T>(),
            new_instance: new_instance::<T>,
            new_instance_boxed: new_instance_boxed::<T>,
            decode: decode::<T>,
        }
    }

    /// Canonical name the type is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiler-provided name of the Rust type, for diagnostics only.
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Creates a `Default` instance of the type.
    pub fn new_instance(&self) -> Box<dyn Packable> {
        (self.new_instance)()
    }

    /// Creates a `Box` holding a `Default` instance of the type.
    ///
    /// The returned value's concrete type is `Box<T>`, named `"*" + name`.
    pub fn new_instance_boxed(&self) -> Box<dyn Packable> {
        (self.new_instance_boxed)()
    }

    /// Decodes a generic binary encoding of the type.
    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Packable>> {
        (self.decode)(bytes)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("rust_type", &self.rust_type)
            .finish()
    }
}

fn new_instance<T: Registrable>() -> Box<dyn Packable> {
    Box::new(T::default())
}

fn new_instance_boxed<T: Registrable>() -> Box<dyn Packable> {
    Box::new(Box::new(T::default()))
}

fn decode<T: Registrable>(bytes: &[u8]) -> Result<Box<dyn Packable>> {
    Ok(Box::new(binary::from_slice::<T>(bytes)?))
}

/// Thread-safe mapping of canonical type names to [`TypeDescriptor`]s.
///
/// Registering a second type under a name that is already present replaces the
/// earlier registration.
pub struct TypeRegistry {
    types: RwLock<ahash::HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry {
            types: RwLock::new(ahash::HashMap::default()),
        }
    }

    /// Registers `T` under its canonical name.
    pub fn add<T: Registrable>(&self) {
        self.add_descriptor(TypeDescriptor::of::<T>());
    }

    /// Registers the type of `value` under its canonical name.
    pub fn add_type_of<T: Registrable>(&self, _value: &T) {
        self.add::<T>();
    }

    /// Stores `descriptor`, replacing any descriptor registered under the same name.
    pub fn add_descriptor(&self, descriptor: TypeDescriptor) {
        let descriptor = Arc::new(descriptor);
        let previous = self
            .types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(descriptor.name.clone(), descriptor.clone());
        match previous {
            Some(previous) => log::debug!(
                "type registry: '{}' replaced {} with {}",
                descriptor.name,
                previous.rust_type,
                descriptor.rust_type
            ),
            None => log::debug!(
                "type registry: registered '{}' as {}",
                descriptor.name,
                descriptor.rust_type
            ),
        }
    }

    /// Returns the descriptor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownTypeName`] if nothing is registered under `name`.
    pub fn get_type(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_type_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Creates a `Default` instance of the type registered under `name`.
    pub fn create_instance(&self, name: &str) -> Result<Box<dyn Packable>> {
        Ok(self.get_type(name)?.new_instance())
    }

    /// Creates a boxed `Default` instance of the type registered under `name`.
    pub fn create_instance_boxed(&self, name: &str) -> Result<Box<dyn Packable>> {
        Ok(self.get_type(name)?.new_instance_boxed())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.read().keys().cloned().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    fn read(&self) -> RwLockReadGuard<'_, ahash::HashMap<String, Arc<TypeDescriptor>>> {
        self.types.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Selects the registry the free functions of this module operate on.
///
/// When no registry is set, the process-wide default registry is used.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistryOptions {
    pub registry: Option<Arc<TypeRegistry>>,
}

impl TypeRegistryOptions {
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Returns the selected registry, falling back to the default registry.
    pub fn resolve(&self) -> Arc<TypeRegistry> {
        self.registry.clone().unwrap_or_else(default_type_registry)
    }
}

/// Process-wide registry used when no registry is supplied.
static DEFAULT_TYPE_REGISTRY: LazyLock<Arc<TypeRegistry>> =
    LazyLock::new(|| Arc::new(TypeRegistry::new()));

/// Returns the process-wide default registry.
pub fn default_type_registry() -> Arc<TypeRegistry> {
    DEFAULT_TYPE_REGISTRY.clone()
}

/// Registers the type of `value` in the selected registry.
///
/// # Errors
///
/// Returns [`ErrorKind::NilType`] if `value` is `None`; the registry is left unchanged.
pub fn register_type<T: Registrable>(value: Option<&T>, options: &TypeRegistryOptions) -> Result<()> {
    let Some(value) = value else {
        return Err(ErrorKind::NilType.into());
    };
    options.resolve().add_type_of(value);
    Ok(())
}

/// Returns the descriptor registered under `name` in the selected registry.
pub fn registered_type(name: &str, options: &TypeRegistryOptions) -> Result<Arc<TypeDescriptor>> {
    options.resolve().get_type(name)
}

/// Creates a `Default` instance of the type registered under `name`.
pub fn create_instance(name: &str, options: &TypeRegistryOptions) -> Result<Box<dyn Packable>> {
    options.resolve().create_instance(name)
}

/// Creates a boxed `Default` instance of the type registered under `name`.
pub fn create_instance_boxed(
    name: &str,
    options: &TypeRegistryOptions,
) -> Result<Box<dyn Packable>> {
    options.resolve().create_instance_boxed(name)
}
