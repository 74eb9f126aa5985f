//! Backend registry for name-based lookup.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

/// Factory function type for registered backends.
type Factory = Box<dyn Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Central registry mapping backend names to constructors.
pub struct BackendRegistry {
    factories: FxHashMap<String, Factory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a backend type constructed through [`BackendFactory`].
    pub fn register<B>(&mut self, name: impl Into<String>)
    where
        B: BackendFactory + Backend + 'static,
    {
        let name = name.into();
        debug!("Registering backend: {}", name);
        self.factories.insert(
            name,
            Box::new(|config| {
                let backend = B::from_config(config)?;
                Ok(Box::new(backend))
            }),
        );
    }

    /// Register a backend with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering factory backend: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Create a backend by name.
    pub fn create(&self, name: &str, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        match self.factories.get(name) {
            Some(factory) => factory(config),
            None => Err(HalError::BackendUnavailable(format!(
                "No backend registered with name '{name}'"
            ))),
        }
    }

    /// Create a shareable backend by name with a default configuration.
    pub fn create_shared(&self, name: &str) -> HalResult<Arc<dyn Backend>> {
        self.create(name, BackendConfig::new(name)).map(Arc::from)
    }

    /// List all registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend is registered under `name`.
    pub fn has_backend(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = BackendRegistry::new();
        assert!(registry.available_backends().is_empty());
        assert!(!registry.has_backend("fake_manila"));
    }

    #[test]
    fn test_create_unknown_backend() {
        let registry = BackendRegistry::new();
        let result = registry.create("nonexistent", BackendConfig::new("nonexistent"));
        assert!(matches!(result, Err(HalError::BackendUnavailable(_))));
    }

    #[test]
    fn test_available_backends_sorted() {
        let mut registry = BackendRegistry::new();
        registry.register_factory("fake_quito", |_| {
            Err(HalError::BackendUnavailable("test".into()))
        });
        registry.register_factory("fake_lima", |_| {
            Err(HalError::BackendUnavailable("test".into()))
        });

        assert!(registry.has_backend("fake_quito"));
        assert_eq!(registry.available_backends(), vec!["fake_lima", "fake_quito"]);
    }
}
