//! qrt backend abstraction layer
//!
//! This crate defines the interface every execution target implements,
//! whether it is the local simulator or a fake device model:
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe gates, connectivity and limits
//! - [`RunOptions`] and [`SimulationMethod`] for per-run settings
//! - Unified results via [`ExecutionResult`], [`ExperimentResult`] and
//!   [`Counts`], plus [`ExpectationResult`] for exact observables
//! - [`BackendRegistry`] for lookup by name
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use qrt_hal::{BackendExt, RunOptions, SimulationMethod};
//! use qrt_adapter_sim::LocalSimulator;
//! use qrt_ir::reference;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = LocalSimulator::new();
//!     let options = RunOptions::new(1000)
//!         .with_seed(42)
//!         .with_method(SimulationMethod::Statevector);
//!
//!     let job = backend.run(&[reference::bell()?], &options).await?;
//!     let result = job.result().await?;
//!
//!     if let Some((bitstring, count)) = result.results[0].counts.most_frequent() {
//!         println!("Most frequent: {} ({} times)", bitstring, count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod capability;
pub mod error;
pub mod handle;
pub mod job;
pub mod options;
pub mod registry;
pub mod result;

pub use auth::{EnvTokenProvider, StaticTokenProvider, TokenProvider};
pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use handle::{BackendExt, JobHandle};
pub use job::{Job, JobId, JobStatus};
pub use options::{DEFAULT_SHOTS, RunOptions, SimulationMethod};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult, ExpectationResult, ExperimentMetadata, ExperimentResult};
