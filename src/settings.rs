//! Configuration settings validation.
//!
//! Framework settings are plain key/value pairs (`cacheEnabled = true`) that end up
//! on a settings object through its setters. Before any of them is applied, every
//! key must name a writable property of the settings type; a misspelled key is
//! reported instead of being silently ignored.
//!
//! # Examples
//!
//! ```rust
//! use beanscope::prelude::*;
//! use beanscope::typesystem::PrimitiveKind;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let configuration = registry
//!     .class("com.example", "Configuration")
//!     .property("cacheEnabled", registry.primitive(PrimitiveKind::Boolean))
//!     .build()?;
//!
//! let factory: ReflectorFactoryRc = Arc::new(DefaultReflectorFactory::new(registry.clone()));
//! let meta = MetaClass::for_class(configuration, &factory)?;
//!
//! let mut settings = Settings::new();
//! settings.insert("cacheEnabled", "true");
//! assert!(settings.validate(&meta).is_ok());
//!
//! settings.insert("cacheEnable", "true");
//! assert!(matches!(
//!     settings.validate(&meta),
//!     Err(Error::UnknownSetting { key }) if key == "cacheEnable"
//! ));
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::{reflection::MetaClass, Error, Result};

/// Ordered configuration key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, String>,
}

impl Settings {
    /// Create an empty settings map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// The value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Check that every key is writable on the type described by `meta`
    ///
    /// Keys are matched exactly (case sensitive) and may be property paths.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSetting`] for the first key, in key order, that has
    /// no setter.
    pub fn validate(&self, meta: &MetaClass) -> Result<&Self> {
        for key in self.entries.keys() {
            if !meta.has_setter(key)? {
                return Err(Error::UnknownSetting { key: key.clone() });
            }
        }

        debug!(
            class = meta.reflector().class_name(),
            settings = self.entries.len(),
            "settings validated"
        );
        Ok(self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Settings {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        reflection::{DefaultReflectorFactory, ReflectorFactoryRc},
        typesystem::{PrimitiveKind, TypeId, TypeRegistry, TypeSystem},
    };

    fn configuration() -> (ReflectorFactoryRc, TypeId) {
        let registry = Arc::new(TypeRegistry::new());
        let boolean = registry.primitive(PrimitiveKind::Boolean);
        let int = registry.primitive(PrimitiveKind::Int);
        let environment = registry
            .class("config", "Environment")
            .property("id", registry.string_type())
            .build()
            .unwrap();
        let ty = registry
            .class("config", "Configuration")
            .property("cacheEnabled", boolean)
            .property("defaultStatementTimeout", int)
            .property("environment", environment)
            .getter("getDatabaseId", registry.string_type())
            .build()
            .unwrap();

        let factory: ReflectorFactoryRc = Arc::new(DefaultReflectorFactory::new(registry));
        (factory, ty)
    }

    #[test]
    fn test_validate_known_keys() {
        let (factory, ty) = configuration();
        let meta = MetaClass::for_class(ty, &factory).unwrap();

        let settings: Settings = [
            ("cacheEnabled", "true"),
            ("defaultStatementTimeout", "25"),
            ("environment.id", "dev"),
        ]
        .into_iter()
        .collect();
        assert_eq!(settings.validate(&meta).unwrap().len(), 3);
        assert_eq!(settings.get("defaultStatementTimeout"), Some("25"));
    }

    #[test]
    fn test_validate_rejects_unknown_and_read_only() {
        let (factory, ty) = configuration();
        let meta = MetaClass::for_class(ty, &factory).unwrap();

        let mut settings = Settings::new();
        settings.insert("CacheEnabled", "true");
        assert!(matches!(
            settings.validate(&meta),
            Err(Error::UnknownSetting { key }) if key == "CacheEnabled"
        ));

        let read_only: Settings = [("databaseId", "mysql")].into_iter().collect();
        assert!(matches!(
            read_only.validate(&meta),
            Err(Error::UnknownSetting { key }) if key == "databaseId"
        ));
    }

    #[test]
    fn test_settings_order() {
        let mut settings = Settings::new();
        assert!(settings.is_empty());
        settings.insert("b", "2");
        settings.insert("a", "1");
        assert_eq!(settings.insert("a", "3"), Some("1".to_string()));

        let keys: Vec<_> = settings.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
