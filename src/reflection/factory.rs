//! Reflector cache.
//!
//! Building a property table walks the entire type hierarchy, so tables are built
//! once per type and shared. [`DefaultReflectorFactory`] keeps them in a concurrent
//! map and guarantees that concurrent first lookups of the same type construct the
//! table only once. Failed constructions are never cached, so a later lookup retries.
//!
//! # Examples
//!
//! ```rust
//! use beanscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let user = registry
//!     .class("com.example", "User")
//!     .property("name", registry.string_type())
//!     .build()?;
//!
//! let factory = DefaultReflectorFactory::new(registry.clone());
//! let first = factory.find_for_class(user)?;
//! let second = factory.find_for_class(user)?;
//! assert!(Arc::ptr_eq(&first, &second));
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    reflection::{Reflector, ReflectorConfig},
    typesystem::{TypeId, TypeSystemRc},
    Result,
};

/// Shared reference to a reflector factory
pub type ReflectorFactoryRc = Arc<dyn ReflectorFactory>;

/// Hands out property tables by type
pub trait ReflectorFactory: Send + Sync {
    /// Returns `true` if tables are kept after construction
    fn is_class_cache_enabled(&self) -> bool;

    /// Turn caching on or off; already cached tables stay cached
    fn set_class_cache_enabled(&self, enabled: bool);

    /// The property table of `ty`
    ///
    /// # Errors
    /// Returns the construction error of [`Reflector::new`].
    fn find_for_class(&self, ty: TypeId) -> Result<Arc<Reflector>>;
}

/// Concurrent, single-flight reflector cache
pub struct DefaultReflectorFactory {
    types: TypeSystemRc,
    config: ReflectorConfig,
    cache_enabled: AtomicBool,
    cache: DashMap<TypeId, Arc<Reflector>>,
    in_flight: DashMap<TypeId, Arc<Mutex<()>>>,
}

impl DefaultReflectorFactory {
    /// Create a factory with the default configuration
    #[must_use]
    pub fn new(types: TypeSystemRc) -> Self {
        Self::with_config(types, ReflectorConfig::default())
    }

    /// Create a factory
    ///
    /// ## Arguments
    /// * 'types'  - The type system all reflected types come from
    /// * 'config' - Caching and construction options
    #[must_use]
    pub fn with_config(types: TypeSystemRc, config: ReflectorConfig) -> Self {
        DefaultReflectorFactory {
            types,
            cache_enabled: AtomicBool::new(config.cache_enabled),
            config,
            cache: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// The type system backing this factory
    #[must_use]
    pub fn types(&self) -> &TypeSystemRc {
        &self.types
    }

    /// Number of cached tables
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Build and cache the tables of `types` in parallel
    ///
    /// # Errors
    /// Returns a construction error if any of the tables fails to build; the
    /// tables that did build stay cached.
    pub fn preload(&self, types: &[TypeId]) -> Result<()> {
        types
            .par_iter()
            .try_for_each(|ty| self.find_for_class(*ty).map(|_| ()))
    }

    fn build(&self, ty: TypeId) -> Result<Reflector> {
        Reflector::with_config(&self.types, ty, &self.config)
    }

    fn cached(&self, ty: TypeId) -> Option<Arc<Reflector>> {
        self.cache.get(&ty).map(|entry| entry.value().clone())
    }
}

impl ReflectorFactory for DefaultReflectorFactory {
    fn is_class_cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::Acquire)
    }

    fn set_class_cache_enabled(&self, enabled: bool) {
        self.cache_enabled.store(enabled, Ordering::Release);
    }

    fn find_for_class(&self, ty: TypeId) -> Result<Arc<Reflector>> {
        if !self.is_class_cache_enabled() {
            return Ok(Arc::new(self.build(ty)?));
        }
        if let Some(reflector) = self.cached(ty) {
            return Ok(reflector);
        }

        let gate = self
            .in_flight
            .entry(ty)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let _guard = lock!(gate);

        if let Some(reflector) = self.cached(ty) {
            return Ok(reflector);
        }

        debug!(ty = %ty, "reflector cache miss");
        let built = self.build(ty).map(Arc::new);
        if let Ok(reflector) = &built {
            self.cache.insert(ty, reflector.clone());
        }
        self.in_flight.remove(&ty);
        built
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread};

    use super::*;
    use crate::{
        runtime::Value,
        typesystem::{PrimitiveKind, TypeRegistry, TypeSystem},
        Error,
    };

    #[test]
    fn test_factory_caches() {
        let registry = Arc::new(TypeRegistry::new());
        let ty = registry
            .class("test", "Cached")
            .property("id", registry.primitive(PrimitiveKind::Long))
            .build()
            .unwrap();

        let factory = DefaultReflectorFactory::new(registry.clone());
        assert!(factory.is_class_cache_enabled());

        let first = factory.find_for_class(ty).unwrap();
        let second = factory.find_for_class(ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.cached_len(), 1);
    }

    #[test]
    fn test_factory_uncached() {
        let registry = Arc::new(TypeRegistry::new());
        let ty = registry.class("test", "Fresh").build().unwrap();

        let factory =
            DefaultReflectorFactory::with_config(registry.clone(), ReflectorConfig::uncached());
        assert!(!factory.is_class_cache_enabled());

        let first = factory.find_for_class(ty).unwrap();
        let second = factory.find_for_class(ty).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(factory.cached_len(), 0);

        factory.set_class_cache_enabled(true);
        let third = factory.find_for_class(ty).unwrap();
        assert!(Arc::ptr_eq(&third, &factory.find_for_class(ty).unwrap()));
    }

    #[test]
    fn test_factory_failures_not_cached() {
        let registry = Arc::new(TypeRegistry::new());
        let string = registry.string_type();
        let ty = registry
            .class("test", "Broken")
            .getter("getName", string)
            .getter("isName", string)
            .build()
            .unwrap();

        let factory = DefaultReflectorFactory::new(registry.clone());
        assert!(matches!(
            factory.find_for_class(ty),
            Err(Error::AmbiguousGetter { .. })
        ));
        assert_eq!(factory.cached_len(), 0);
        assert!(factory.find_for_class(ty).is_err());
    }

    #[test]
    fn test_factory_single_flight() {
        let registry = Arc::new(TypeRegistry::new());
        let ty = registry
            .class("test", "Contended")
            .property("value", registry.string_type())
            .build()
            .unwrap();

        let factory = Arc::new(DefaultReflectorFactory::new(registry.clone()));
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = factory.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    factory.find_for_class(ty).unwrap()
                })
            })
            .collect();

        let reflectors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for reflector in &reflectors[1..] {
            assert!(Arc::ptr_eq(&reflectors[0], reflector));
        }
        assert_eq!(factory.cached_len(), 1);

        // the cached table still invokes against fresh objects
        let instance = registry.allocate(ty).unwrap();
        reflectors[0]
            .set_invoker("value")
            .unwrap()
            .invoke(&instance, &[Value::from("x")])
            .unwrap();
        assert_eq!(instance.get(ty, "value").unwrap(), Value::from("x"));
    }

    #[test]
    fn test_factory_preload() {
        let registry = Arc::new(TypeRegistry::new());
        let ids: Vec<_> = (0..16)
            .map(|index| {
                registry
                    .class("test", &format!("Bean{}", index))
                    .property("name", registry.string_type())
                    .build()
                    .unwrap()
            })
            .collect();

        let factory = DefaultReflectorFactory::new(registry.clone());
        factory.preload(&ids).unwrap();
        assert_eq!(factory.cached_len(), 16);
    }
}
