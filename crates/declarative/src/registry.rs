//! Registry of resource definitions
//!
//! The registry is built once at startup and handed to the
//! [`Engine`](crate::Engine) by reference. Type names are unique: a second
//! registration under the same name fails instead of replacing the first.

use crate::error::{Error, Result};
use crate::resource::{Erased, ErasedResource, Resource};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from resource type name to its handler
#[derive(Default)]
pub struct Registry {
    resources: BTreeMap<&'static str, Box<dyn ErasedResource>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource definition
    ///
    /// Fails with [`Error::DuplicateType`] if the type name is taken.
    pub fn register<R: Resource>(&mut self, resource: R) -> Result<()> {
        if self.resources.contains_key(R::TYPE) {
            return Err(Error::DuplicateType(R::TYPE.to_string()));
        }
        log::debug!("Registered resource type {}", R::TYPE);
        self.resources.insert(R::TYPE, Box::new(Erased(resource)));
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<R: Resource>(mut self, resource: R) -> Result<Self> {
        self.register(resource)?;
        Ok(self)
    }

    /// Check if a type name is registered
    pub fn contains(&self, resource_type: &str) -> bool {
        self.resources.contains_key(resource_type)
    }

    /// Registered type names in sorted order
    pub fn types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Typed handler for `R`, if `R` is the type registered under `R::TYPE`
    pub(crate) fn get<R: Resource>(&self) -> Option<&R> {
        self.resources.get(R::TYPE)?.as_any().downcast_ref::<R>()
    }

    pub(crate) fn get_erased(&self, resource_type: &str) -> Option<&dyn ErasedResource> {
        self.resources.get(resource_type).map(Box::as_ref)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::types::Outcome;

    struct Noop;

    impl Resource for Noop {
        const TYPE: &'static str = "test::Noop";
        type Props = ();
        type Output = ();

        fn reconcile(
            &self,
            ctx: Context<'_, ()>,
            _id: &str,
            _props: &(),
        ) -> anyhow::Result<Outcome<()>> {
            Ok(ctx.commit(()))
        }
    }

    struct Other;

    impl Resource for Other {
        const TYPE: &'static str = "test::Other";
        type Props = ();
        type Output = ();

        fn reconcile(
            &self,
            ctx: Context<'_, ()>,
            _id: &str,
            _props: &(),
        ) -> anyhow::Result<Outcome<()>> {
            Ok(ctx.destroy())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new().with(Noop).unwrap().with(Other).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("test::Noop"));
        assert!(!registry.contains("test::Missing"));
        assert_eq!(
            registry.types().collect::<Vec<_>>(),
            vec!["test::Noop", "test::Other"]
        );
        assert!(registry.get::<Noop>().is_some());
        assert!(registry.get_erased("test::Other").is_some());
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let mut registry = Registry::new();
        registry.register(Noop).unwrap();

        let err = registry.register(Noop).unwrap_err();
        assert!(matches!(err, Error::DuplicateType(ref t) if t == "test::Noop"));
        assert!(err.is_configuration());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.get::<Noop>().is_none());
        assert_eq!(format!("{:?}", registry), "Registry { types: [] }");
    }
}
