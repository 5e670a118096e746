//! Process-wide catalog of approaches, keyed by [`Approach::name`].
//!
//! Callers that persist packed bytes also persist the name of the approach that
//! produced them. The catalog maps that name back to an approach instance when the
//! bytes are read.
//!
//! # Thread Safety
//!
//! The catalog uses a `RwLock`: registration is exclusive, lookups are shared.

use std::sync::{Arc, PoisonError, RwLock};

use dynpack_common::{Result, approach::Approach, error::Error};

/// Adds an approach to the catalog under its own name.
///
/// An approach already registered under the same name is replaced.
pub fn add(approach: impl Into<Arc<dyn Approach>>) {
    let approach = approach.into();
    let name = approach.name().to_string();
    let previous = CATALOG
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.clone(), approach);
    if previous.is_some() {
        log::debug!("approach catalog: replaced '{name}'");
    } else {
        log::debug!("approach catalog: added '{name}'");
    }
}

/// Retrieves an approach by name.
///
/// # Errors
///
/// Returns an `Error::invalid_arg` if no approach with the specified name is registered.
pub fn get(name: impl AsRef<str>) -> Result<Arc<dyn Approach>> {
    let name = name.as_ref();
    let approach = CATALOG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned();
    approach
        .ok_or_else(|| Error::invalid_arg("approach name", format!("Approach '{name}' not found")))
}

/// Names of all cataloged approaches, sorted.
pub fn names() -> Vec<String> {
    let mut names = CATALOG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect::<Vec<_>>();
    names.sort_unstable();
    names
}

static CATALOG: RwLock<ahash::HashMap<String, Arc<dyn Approach>>> =
    RwLock::new(ahash::HashMap::with_hasher(ahash::RandomState::with_seeds(
        52311845, 9044712365, 1877023490, 4560093321,
    )));

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dynpack_common::{
        Result, approach::Approach, error::ErrorKind, value::Packable,
    };

    struct Named(&'static str);

    impl Approach for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn is_serialisable(&self, value: Option<&dyn Packable>) -> bool {
            value.is_none()
        }

        fn pack(&self, _value: Option<&dyn Packable>) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn unpack(&self, _data: &[u8]) -> Result<Option<Box<dyn Packable>>> {
            Ok(None)
        }
    }

    #[test]
    fn test_add_and_get() {
        super::add(Arc::new(Named("catalog-test-a")) as Arc<dyn Approach>);
        let approach = super::get("catalog-test-a").unwrap();
        assert_eq!(approach.name(), "catalog-test-a");
        assert!(super::names().contains(&"catalog-test-a".to_string()));
    }

    #[test]
    fn test_unknown_name() {
        let err = super::get("catalog-test-missing").err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_replace() {
        let first: Arc<dyn Approach> = Arc::new(Named("catalog-test-b"));
        let second: Arc<dyn Approach> = Arc::new(Named("catalog-test-b"));
        super::add(first.clone());
        super::add(second.clone());
        assert!(Arc::ptr_eq(&super::get("catalog-test-b").unwrap(), &second));
    }
}
