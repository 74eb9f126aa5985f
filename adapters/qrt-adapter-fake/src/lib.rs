//! qrt Fake Device Backends
//!
//! Mock hardware for testing code paths that normally target a real
//! device. Each backend carries a device snapshot (qubit count, basis gates,
//! coupling map and averaged calibration data) and executes circuits on the
//! local simulator with a matching noise model.
//!
//! | Backend | Qubits | Coupling |
//! |---------|--------|----------|
//! | `fake_manila` | 5 | line |
//! | `fake_lima` | 5 | T |
//! | `fake_quito` | 5 | T |
//! | `fake_almaden` | 20 | heavy square |
//!
//! # Example
//!
//! ```ignore
//! use qrt_adapter_fake::{FakeBackend, FakeProvider};
//! use qrt_hal::{BackendExt, RunOptions};
//! use qrt_ir::reference;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = FakeBackend::almaden();
//!     let job = backend.run(&[reference::bell()?], &RunOptions::new(1000)).await?;
//!     println!("{:?}", job.result().await?.results[0].counts);
//!
//!     // Or by name
//!     let manila = FakeProvider::new().backend("fake_manila")?;
//!     println!("{} qubits", manila.capabilities().num_qubits);
//!     Ok(())
//! }
//! ```

mod backend;
mod device;
mod provider;

pub use backend::FakeBackend;
pub use device::{DEVICE_NAMES, DeviceSnapshot};
pub use provider::FakeProvider;
