//! qrt Runtime
//!
//! Sampler and estimator primitives running on the local simulator or on
//! fake device backends, behind a runtime service that mirrors the hosted
//! one without leaving the process.
//!
//! # Overview
//!
//! - [`FakeRuntimeService`]: account handling and backend lookup by name
//! - [`Sampler`]: quasi-probability distributions of measured circuits
//! - [`Estimator`]: expectation values of [`SparsePauliOp`] observables
//! - [`RuntimeJob`]: handle to a primitive job running on Tokio
//!
//! # Example
//!
//! ```ignore
//! use qrt_runtime::{Channel, Estimator, FakeRuntimeService, Sampler, SparsePauliOp};
//! use qrt_ir::reference;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = FakeRuntimeService::new(Channel::IbmQuantum, "my_token")?;
//!     let backend = service.backend("fake_manila")?;
//!     let bell = reference::bell()?;
//!
//!     let sampler = Sampler::new(backend.clone())?;
//!     let dist = sampler.run(&[bell.clone()], Some(100))?.result().await?;
//!     println!("P(00) = {:.2}", dist.quasi_dists[0][0]);
//!
//!     let estimator = Estimator::new(backend)?;
//!     let zz = SparsePauliOp::from_label("ZZ")?;
//!     let value = estimator.run(&[bell], &[zz], Some(100))?.result().await?;
//!     println!("<ZZ> = {:.3}", value.values[0]);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod channel;
pub mod error;
pub mod estimator;
pub mod job;
pub mod result;
pub mod sampler;
pub mod service;
pub mod target;

pub use account::{AccountConfig, AccountStore, load_account, save_account};
pub use channel::Channel;
pub use error::{RuntimeError, RuntimeResult};
pub use estimator::{Estimator, EstimatorOptions};
pub use job::RuntimeJob;
pub use result::{
    EstimatorMetadata, EstimatorResult, MAX_OUTCOME_BITS, QuasiDistribution, SamplerMetadata,
    SamplerResult,
};
pub use sampler::{Sampler, SamplerOptions};
pub use service::FakeRuntimeService;
pub use target::BackendTarget;

#[cfg(feature = "local-simulator")]
pub use target::LOCAL_SIMULATOR;

pub use qrt_adapter_fake::{FakeBackend, FakeProvider};
#[cfg(feature = "local-simulator")]
pub use qrt_adapter_sim::LocalSimulator;
pub use qrt_hal::{Backend, RunOptions, SimulationMethod};
pub use qrt_ir::{Circuit, SparsePauliOp};
