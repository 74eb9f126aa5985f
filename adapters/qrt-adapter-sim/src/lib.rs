//! qrt Local Simulator
//!
//! This crate provides the local simulator backend used for testing,
//! development, and as the execution engine behind the fake device
//! backends. Three engines share one [`Backend`](qrt_hal::Backend)
//! implementation:
//!
//! | Method | Engine | Practical limit |
//! |--------|--------|-----------------|
//! | `statevector` | dense amplitudes | 24 qubits |
//! | `density_matrix` | vectorised `ρ`, exact noise channels | 12 qubits |
//! | `stabilizer` | Aaronson–Gottesman tableau, Clifford only | 1000 qubits |
//! | `extended_stabilizer` | dense amplitudes | 24 qubits |
//! | `matrix_product_state` | dense amplitudes | 24 qubits |
//!
//! # Features
//!
//! - **Measure Sampling**: circuits with terminal measurements are simulated
//!   once and every shot is sampled from the final state
//! - **Noise**: per-qubit readout error and depolarizing gate error
//! - **Seeded Runs**: identical seeds give identical counts
//! - **Exact Expectation Values** through `Backend::estimate`
//!
//! # Example
//!
//! ```ignore
//! use qrt_adapter_sim::LocalSimulator;
//! use qrt_hal::{BackendExt, RunOptions, SimulationMethod};
//! use qrt_ir::reference;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = LocalSimulator::with_method(SimulationMethod::Statevector);
//!
//!     let job = backend
//!         .run(&[reference::bell()?], &RunOptions::new(1000).with_seed(42))
//!         .await?;
//!     let result = job.result().await?;
//!
//!     // Expect ~50% |00⟩ and ~50% |11⟩
//!     println!("Results: {:?}", result.results[0].counts);
//!     Ok(())
//! }
//! ```

mod density_matrix;
mod engine;
mod executor;
mod noise;
mod simulator;
mod stabilizer;
mod statevector;
mod unitary;

pub use noise::NoiseModel;
pub use simulator::{
    DEFAULT_MAX_QUBITS, DENSITY_MATRIX_MAX_QUBITS, LocalSimulator, MAX_SHOTS,
    STABILIZER_MAX_QUBITS,
};
pub use unitary::gate_matrix;
