//! Backend capability introspection.
//!
//! Describes what a backend can do: qubit count, supported gates,
//! connectivity and shot limits. All edges in [`Topology`] are
//! bidirectional.

use serde::{Deserialize, Serialize};

/// Hardware (or simulated hardware) capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM 3 naming convention).
    pub gate_set: GateSet,
    /// Qubit connectivity topology. All edges are bidirectional.
    pub topology: Topology,
    /// Maximum number of shots per circuit.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or a device model (`false`).
    pub is_simulator: bool,
    /// Additional capability flags, e.g. `"statevector"`, `"stabilizer"`,
    /// `"noise_model"`, `"mid_circuit_measurement"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for an all-to-all simulator.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec![],
        }
    }

    /// Create capabilities for a device model with a fixed basis and
    /// coupling map.
    pub fn device(
        name: impl Into<String>,
        num_qubits: u32,
        gate_set: GateSet,
        topology: Topology,
    ) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set,
            topology,
            max_shots: 100_000,
            is_simulator: false,
            features: vec![],
        }
    }

    /// Replace the feature flags.
    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Set the shot limit.
    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.max_shots = max_shots;
        self
    }

    /// Check if a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate set supported by a backend.
///
/// If `native` is empty, all supported gates are considered native
/// (typical for simulators).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
    /// Native gates (execute without decomposition on this backend).
    pub native: Vec<String>,
}

impl GateSet {
    /// Every gate the circuit IR can express.
    pub fn universal() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            single_qubit: names(&[
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz",
                "p", "u",
            ]),
            two_qubit: names(&[
                "cx", "cy", "cz", "ch", "swap", "iswap", "crx", "cry", "crz", "cp", "rxx", "ryy",
                "rzz",
            ]),
            three_qubit: names(&["ccx", "cswap"]),
            native: vec![],
        }
    }

    /// Build a basis gate set from a flat list of names, sorting each name
    /// into its arity bucket.
    ///
    /// Names that the IR does not know are kept as single-qubit entries.
    pub fn from_basis(basis: &[String]) -> Self {
        let mut set = Self {
            single_qubit: vec![],
            two_qubit: vec![],
            three_qubit: vec![],
            native: basis.to_vec(),
        };
        for name in basis {
            match name.as_str() {
                "cx" | "cy" | "cz" | "ch" | "swap" | "iswap" | "ecr" | "crx" | "cry" | "crz"
                | "cp" | "rxx" | "ryy" | "rzz" => set.two_qubit.push(name.clone()),
                "ccx" | "cswap" => set.three_qubit.push(name.clone()),
                _ => set.single_qubit.push(name.clone()),
            }
        }
        set
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
            || self.three_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native (executes without decomposition).
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}

/// Qubit connectivity topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges (pairs of connected qubits). Bidirectional.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a linear topology.
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self {
            kind: TopologyKind::Linear,
            edges,
        }
    }

    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Create a custom topology from edges.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Custom,
            edges,
        }
    }

    /// Check if two qubits are connected.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        match self.kind {
            TopologyKind::FullyConnected => q1 != q2,
            _ => self
                .edges
                .iter()
                .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1)),
        }
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
    /// Linear chain.
    Linear,
    /// Device-specific coupling map.
    Custom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator("local_simulator", 24)
            .with_features(["statevector", "stabilizer"]);
        assert!(caps.is_simulator);
        assert!(caps.gate_set.contains("rzz"));
        assert!(caps.topology.is_connected(0, 23));
        assert!(caps.has_feature("stabilizer"));
        assert!(!caps.has_feature("density_matrix"));
    }

    #[test]
    fn test_basis_gate_set() {
        let basis: Vec<String> = ["id", "rz", "sx", "x", "cx"].iter().map(|s| s.to_string()).collect();
        let gates = GateSet::from_basis(&basis);
        assert_eq!(gates.two_qubit, vec!["cx"]);
        assert!(gates.is_native("sx"));
        assert!(!gates.is_native("h"));
    }

    #[test]
    fn test_linear_topology() {
        let topo = Topology::linear(5);
        assert_eq!(topo.edges.len(), 4);
        assert!(topo.is_connected(1, 0));
        assert!(!topo.is_connected(0, 2));
    }
}
