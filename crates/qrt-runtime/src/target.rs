//! Backend selection for primitives.

use std::fmt;
use std::sync::Arc;

use qrt_adapter_fake::{FakeBackend, FakeProvider};
use qrt_hal::Backend;

use crate::error::RuntimeResult;

/// Name under which the local simulator is reachable.
#[cfg(feature = "local-simulator")]
pub const LOCAL_SIMULATOR: &str = "local_simulator";

/// A backend given either by name or as an instance.
#[derive(Clone)]
pub enum BackendTarget {
    /// A backend name such as `"fake_manila"`.
    Named(String),
    /// A ready backend.
    Instance(Arc<dyn Backend>),
}

impl BackendTarget {
    /// Resolve to a backend instance.
    ///
    /// Names go through the fake provider; `local_simulator` names the
    /// default local simulator.
    pub fn resolve(&self) -> RuntimeResult<Arc<dyn Backend>> {
        match self {
            BackendTarget::Instance(backend) => Ok(Arc::clone(backend)),
            BackendTarget::Named(name) => resolve_name(name),
        }
    }
}

pub(crate) fn resolve_name(name: &str) -> RuntimeResult<Arc<dyn Backend>> {
    match local_backend(name) {
        Some(backend) => Ok(backend),
        None => Ok(FakeProvider::new().backend(name)?),
    }
}

#[cfg(feature = "local-simulator")]
fn local_backend(name: &str) -> Option<Arc<dyn Backend>> {
    (name == LOCAL_SIMULATOR)
        .then(|| Arc::new(qrt_adapter_sim::LocalSimulator::new()) as Arc<dyn Backend>)
}

#[cfg(not(feature = "local-simulator"))]
fn local_backend(_name: &str) -> Option<Arc<dyn Backend>> {
    None
}

impl fmt::Debug for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendTarget::Named(name) => f.debug_tuple("Named").field(name).finish(),
            BackendTarget::Instance(backend) => {
                f.debug_tuple("Instance").field(&backend.name()).finish()
            }
        }
    }
}

impl From<&str> for BackendTarget {
    fn from(name: &str) -> Self {
        BackendTarget::Named(name.to_string())
    }
}

impl From<String> for BackendTarget {
    fn from(name: String) -> Self {
        BackendTarget::Named(name)
    }
}

impl From<Arc<dyn Backend>> for BackendTarget {
    fn from(backend: Arc<dyn Backend>) -> Self {
        BackendTarget::Instance(backend)
    }
}

impl From<FakeBackend> for BackendTarget {
    fn from(backend: FakeBackend) -> Self {
        BackendTarget::Instance(Arc::new(backend))
    }
}

#[cfg(feature = "local-simulator")]
impl From<qrt_adapter_sim::LocalSimulator> for BackendTarget {
    fn from(backend: qrt_adapter_sim::LocalSimulator) -> Self {
        BackendTarget::Instance(Arc::new(backend))
    }
}
