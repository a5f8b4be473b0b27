//! Reflector configuration
//!
//! This module provides the options that govern how property tables are built and
//! whether a [`crate::reflection::DefaultReflectorFactory`] keeps them around.

/// Configuration for reflector construction and caching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectorConfig {
    /// Keep constructed reflectors in the factory cache (default: true)
    /// When disabled, every lookup builds a fresh property table
    pub cache_enabled: bool,

    /// Maximum number of classes walked up a superclass chain (default: 64)
    /// Deeper hierarchies fail construction with [`crate::Error::RecursionLimit`]
    pub max_hierarchy_depth: usize,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_hierarchy_depth: 64,
        }
    }
}

impl ReflectorConfig {
    /// Creates a configuration that builds a new property table on every lookup
    ///
    /// Useful when types are still being declared and cached tables would go stale.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            cache_enabled: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with a custom hierarchy depth limit
    #[must_use]
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_presets() {
        let default = ReflectorConfig::default();
        assert!(default.cache_enabled);
        assert_eq!(default.max_hierarchy_depth, 64);

        let uncached = ReflectorConfig::uncached();
        assert!(!uncached.cache_enabled);
        assert_eq!(uncached.max_hierarchy_depth, 64);

        let shallow = ReflectorConfig::default().with_max_hierarchy_depth(2);
        assert_eq!(shallow.max_hierarchy_depth, 2);
        assert!(shallow.cache_enabled);
    }
}
