//! Name-based lookup of fake backends.

use std::sync::Arc;

use qrt_hal::{Backend, BackendConfig, BackendRegistry, HalResult};

use crate::backend::FakeBackend;
use crate::device::DEVICE_NAMES;

/// Resolves backend names such as `"fake_manila"` to fake device backends.
pub struct FakeProvider {
    registry: BackendRegistry,
}

impl FakeProvider {
    /// A provider with every bundled device registered.
    pub fn new() -> Self {
        let mut registry = BackendRegistry::new();
        for name in DEVICE_NAMES {
            registry.register_factory(name, move |_config: BackendConfig| {
                Ok(Box::new(FakeBackend::from_name(name)?) as Box<dyn Backend>)
            });
        }
        Self { registry }
    }

    /// Create the backend registered under `name`.
    pub fn backend(&self, name: &str) -> HalResult<Arc<dyn Backend>> {
        self.registry.create_shared(name)
    }

    /// Names of all available backends, sorted.
    pub fn backends(&self) -> Vec<String> {
        self.registry.available_backends()
    }

    /// The underlying registry, for adding further backends.
    pub fn registry_mut(&mut self) -> &mut BackendRegistry {
        &mut self.registry
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrt_hal::HalError;

    #[test]
    fn test_lists_bundled_devices() {
        let provider = FakeProvider::new();
        assert_eq!(
            provider.backends(),
            vec!["fake_almaden", "fake_lima", "fake_manila", "fake_quito"]
        );
    }

    #[test]
    fn test_backend_by_name() {
        let provider = FakeProvider::new();
        let backend = provider.backend("fake_manila").unwrap();
        assert_eq!(backend.name(), "fake_manila");
        assert_eq!(backend.capabilities().num_qubits, 5);

        assert!(matches!(
            provider.backend("fake_nowhere"),
            Err(HalError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_register_extra_backend() {
        let mut provider = FakeProvider::new();
        provider.registry_mut().register::<FakeBackend>("mock_device");
        assert!(provider.backends().contains(&"mock_device".to_string()));
        // The factory reads the device from the config name, which is unknown.
        assert!(provider.backend("mock_device").is_err());
    }
}
