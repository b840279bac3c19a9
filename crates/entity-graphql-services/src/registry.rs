//! Type-keyed service registry.
//!
//! Services are singletons keyed by their type. A service may be a concrete
//! type or a trait object (`dyn ResponseSerializer`); it is stored as an
//! `Arc<T>` behind a type-erased `Arc<dyn Any>`.
//!
//! Two insertion policies are exposed:
//!
//! - [`ServiceRegistryExt::ensure_present`] installs only when nothing is
//!   registered for the type yet
//! - [`ServiceRegistryExt::replace`] always installs, returning the previous
//!   instance

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

/// A type-erased service instance.
pub type ErasedService = Arc<dyn Any + Send + Sync>;

/// Identifies a registered service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceDescriptor {
    /// Descriptor for services of type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Storage backend for singleton services.
///
/// Implementations only deal with erased values; the typed API lives on
/// [`ServiceRegistryExt`].
pub trait ServiceRegistry {
    /// Returns whether a service is registered under `type_id`.
    fn contains(&self, type_id: TypeId) -> bool;

    /// Installs `instance` unless a service is already registered.
    /// Returns `true` when the instance was installed.
    fn insert_if_absent(&mut self, descriptor: ServiceDescriptor, instance: ErasedService) -> bool;

    /// Installs `instance`, returning whatever was registered before.
    fn insert(&mut self, descriptor: ServiceDescriptor, instance: ErasedService) -> Option<ErasedService>;

    /// Returns the service registered under `type_id`.
    fn get(&self, type_id: TypeId) -> Option<ErasedService>;
}

/// Typed helpers over [`ServiceRegistry`].
pub trait ServiceRegistryExt: ServiceRegistry {
    /// Registers `instance` as the `T` singleton unless one already exists.
    ///
    /// Returns `true` when `instance` was installed.
    fn ensure_present<T>(&mut self, instance: Arc<T>) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let erased: ErasedService = Arc::new(instance);
        self.insert_if_absent(ServiceDescriptor::of::<T>(), erased)
    }

    /// Registers `instance` as the `T` singleton, overwriting any previous one.
    fn replace<T>(&mut self, instance: Arc<T>) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let erased: ErasedService = Arc::new(instance);
        self.insert(ServiceDescriptor::of::<T>(), erased)
            .and_then(|previous| downcast::<T>(&previous))
    }

    /// Returns the registered `T` singleton.
    fn resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get(TypeId::of::<T>())
            .and_then(|stored| downcast::<T>(&stored))
    }

    /// Returns whether a `T` singleton is registered.
    fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.contains(TypeId::of::<T>())
    }
}

impl<R: ServiceRegistry + ?Sized> ServiceRegistryExt for R {}

fn downcast<T: ?Sized + Send + Sync + 'static>(stored: &ErasedService) -> Option<Arc<T>> {
    let any: &(dyn Any + Send + Sync) = &**stored;
    any.downcast_ref::<Arc<T>>().cloned()
}

/// In-memory service registry.
///
/// Keeps services in registration order; replacing a service keeps its
/// original position.
#[derive(Clone, Default)]
pub struct ServiceCollection {
    services: IndexMap<TypeId, (ServiceDescriptor, ErasedService)>,
}

impl ServiceCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered service types, in registration order.
    pub fn registrations(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values().map(|(descriptor, _)| descriptor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.registrations().map(|descriptor| descriptor.type_name))
            .finish()
    }
}

impl ServiceRegistry for ServiceCollection {
    fn contains(&self, type_id: TypeId) -> bool {
        self.services.contains_key(&type_id)
    }

    fn insert_if_absent(&mut self, descriptor: ServiceDescriptor, instance: ErasedService) -> bool {
        if self.services.contains_key(&descriptor.type_id) {
            debug!(service = descriptor.type_name, "Service already registered, keeping existing");
            return false;
        }
        debug!(service = descriptor.type_name, "Registered service");
        self.services.insert(descriptor.type_id, (descriptor, instance));
        true
    }

    fn insert(&mut self, descriptor: ServiceDescriptor, instance: ErasedService) -> Option<ErasedService> {
        let previous = self
            .services
            .insert(descriptor.type_id, (descriptor, instance))
            .map(|(_, previous)| previous);
        if previous.is_some() {
            debug!(service = descriptor.type_name, "Replaced service");
        } else {
            debug!(service = descriptor.type_name, "Registered service");
        }
        previous
    }

    fn get(&self, type_id: TypeId) -> Option<ErasedService> {
        self.services
            .get(&type_id)
            .map(|(_, instance)| Arc::clone(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct French;

    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    #[test]
    fn test_ensure_present_keeps_first() {
        let mut services = ServiceCollection::new();
        let first: Arc<dyn Greeter> = Arc::new(English);
        let second: Arc<dyn Greeter> = Arc::new(French);

        assert!(services.ensure_present(Arc::clone(&first)));
        assert!(!services.ensure_present(second));

        let resolved = services.resolve::<dyn Greeter>().unwrap();
        assert!(Arc::ptr_eq(&resolved, &first));
        assert_eq!(resolved.greet(), "hello");
    }

    #[test]
    fn test_replace_overwrites_and_returns_previous() {
        let mut services = ServiceCollection::new();
        assert!(services.replace(Arc::new(1_u32)).is_none());

        let previous = services.replace(Arc::new(2_u32));
        assert_eq!(previous.as_deref(), Some(&1));
        assert_eq!(services.resolve::<u32>().as_deref(), Some(&2));
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn test_resolve_missing() {
        let services = ServiceCollection::new();
        assert!(services.resolve::<String>().is_none());
        assert!(!services.is_registered::<dyn Greeter>());
        assert!(services.is_empty());
    }

    #[test]
    fn test_trait_object_and_concrete_are_distinct_keys() {
        let mut services = ServiceCollection::new();
        services.replace(Arc::new(English));
        let greeter: Arc<dyn Greeter> = Arc::new(French);
        services.replace(greeter);

        assert_eq!(services.len(), 2);
        assert_eq!(services.resolve::<dyn Greeter>().unwrap().greet(), "bonjour");
        assert_eq!(services.resolve::<English>().unwrap().greet(), "hello");
    }

    #[test]
    fn test_registration_order_preserved_on_replace() {
        let mut services = ServiceCollection::new();
        services.replace(Arc::new(1_u8));
        services.replace(Arc::new(String::from("x")));
        services.replace(Arc::new(2_u8));

        let names: Vec<_> = services.registrations().map(|d| d.type_name).collect();
        assert_eq!(names, ["u8", "alloc::string::String"]);
    }
}
