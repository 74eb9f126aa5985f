//! Run options shared by every backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HalError;

/// Default number of shots when none is given.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Simulation method selected for a local run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMethod {
    /// Pick a method from the circuit and noise model.
    #[default]
    Automatic,
    /// Dense state vector.
    Statevector,
    /// Dense density matrix; supports exact noise channels.
    DensityMatrix,
    /// Clifford tableau; Clifford circuits only.
    Stabilizer,
    /// Clifford+T method name; executed on the dense kernels.
    ExtendedStabilizer,
    /// Tensor-network method name; executed on the dense kernels.
    MatrixProductState,
}

impl SimulationMethod {
    /// All selectable methods, `Automatic` first.
    pub const ALL: [SimulationMethod; 6] = [
        SimulationMethod::Automatic,
        SimulationMethod::Statevector,
        SimulationMethod::DensityMatrix,
        SimulationMethod::Stabilizer,
        SimulationMethod::ExtendedStabilizer,
        SimulationMethod::MatrixProductState,
    ];

    /// The method name as reported in result metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            SimulationMethod::Automatic => "automatic",
            SimulationMethod::Statevector => "statevector",
            SimulationMethod::DensityMatrix => "density_matrix",
            SimulationMethod::Stabilizer => "stabilizer",
            SimulationMethod::ExtendedStabilizer => "extended_stabilizer",
            SimulationMethod::MatrixProductState => "matrix_product_state",
        }
    }
}

impl fmt::Display for SimulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationMethod {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimulationMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                HalError::Configuration(format!(
                    "unknown simulation method '{s}' (expected one of: {})",
                    SimulationMethod::ALL.map(SimulationMethod::as_str).join(", ")
                ))
            })
    }
}

/// Options for a backend run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Shots per circuit.
    pub shots: u32,
    /// Seed for the simulator's random number generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_simulator: Option<u64>,
    /// Simulation method override. `None` uses the backend's configured
    /// method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<SimulationMethod>,
    /// Keep per-shot bitstrings in the result.
    #[serde(default)]
    pub memory: bool,
}

impl RunOptions {
    /// Options with the given shot count and nothing else set.
    pub fn new(shots: u32) -> Self {
        Self {
            shots,
            seed_simulator: None,
            method: None,
            memory: false,
        }
    }

    /// Fix the simulator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_simulator = Some(seed);
        self
    }

    /// Override the simulation method.
    pub fn with_method(mut self, method: SimulationMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Keep per-shot memory.
    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SHOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_roundtrip() {
        for method in SimulationMethod::ALL {
            assert_eq!(method.as_str().parse::<SimulationMethod>().unwrap(), method);
        }
        assert!("tensor_network".parse::<SimulationMethod>().is_err());
    }

    #[test]
    fn test_method_serde_names() {
        let json = serde_json::to_string(&SimulationMethod::MatrixProductState).unwrap();
        assert_eq!(json, "\"matrix_product_state\"");
    }

    #[test]
    fn test_run_options_builder() {
        let opts = RunOptions::new(100)
            .with_seed(123)
            .with_method(SimulationMethod::Statevector);
        assert_eq!(opts.shots, 100);
        assert_eq!(opts.seed_simulator, Some(123));
        assert_eq!(opts.method, Some(SimulationMethod::Statevector));
        assert!(!opts.memory);
        assert_eq!(RunOptions::default().shots, DEFAULT_SHOTS);
    }
}
