//! Embedded device snapshots.

use serde::{Deserialize, Serialize};

use qrt_adapter_sim::NoiseModel;
use qrt_hal::{Capabilities, GateSet, HalError, HalResult, Topology};

const FAKE_MANILA: &str = include_str!("../devices/fake_manila.json");
const FAKE_LIMA: &str = include_str!("../devices/fake_lima.json");
const FAKE_QUITO: &str = include_str!("../devices/fake_quito.json");
const FAKE_ALMADEN: &str = include_str!("../devices/fake_almaden.json");

/// Names of the bundled devices, sorted.
pub const DEVICE_NAMES: [&str; 4] = ["fake_almaden", "fake_lima", "fake_manila", "fake_quito"];

/// Static description of a device: its shape plus averaged calibration
/// data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Backend name, e.g. `fake_manila`.
    pub name: String,
    /// Snapshot version.
    pub version: String,
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Native gate names.
    pub basis_gates: Vec<String>,
    /// Coupled qubit pairs. Treated as bidirectional.
    pub coupling_map: Vec<[u32; 2]>,
    /// Readout misclassification probability per qubit.
    pub readout_error: Vec<f64>,
    /// Mean single-qubit gate error.
    pub gate_error_1q: f64,
    /// Mean two-qubit gate error.
    pub gate_error_2q: f64,
}

impl DeviceSnapshot {
    /// Load a bundled snapshot by backend name.
    pub fn load(name: &str) -> HalResult<Self> {
        let raw = match name {
            "fake_manila" => FAKE_MANILA,
            "fake_lima" => FAKE_LIMA,
            "fake_quito" => FAKE_QUITO,
            "fake_almaden" => FAKE_ALMADEN,
            other => {
                return Err(HalError::BackendUnavailable(format!(
                    "unknown fake backend '{other}' (available: {})",
                    DEVICE_NAMES.join(", ")
                )));
            }
        };
        Self::from_json(raw)
    }

    /// Parse and check a snapshot.
    pub fn from_json(raw: &str) -> HalResult<Self> {
        let snapshot: Self = serde_json::from_str(raw)?;
        snapshot.check()?;
        Ok(snapshot)
    }

    fn check(&self) -> HalResult<()> {
        if self.readout_error.len() != self.num_qubits as usize {
            return Err(HalError::Configuration(format!(
                "{}: {} readout errors for {} qubits",
                self.name,
                self.readout_error.len(),
                self.num_qubits
            )));
        }
        if let Some(edge) = self
            .coupling_map
            .iter()
            .find(|[a, b]| *a >= self.num_qubits || *b >= self.num_qubits || a == b)
        {
            return Err(HalError::Configuration(format!(
                "{}: invalid coupling edge {:?}",
                self.name, edge
            )));
        }
        self.noise_model().validate()
    }

    /// Noise model built from the calibration data.
    pub fn noise_model(&self) -> NoiseModel {
        NoiseModel::new()
            .with_readout_error(self.readout_error.clone())
            .with_gate_error_1q(self.gate_error_1q)
            .with_gate_error_2q(self.gate_error_2q)
    }

    /// Coupling map as a HAL topology.
    pub fn topology(&self) -> Topology {
        Topology::custom(self.coupling_map.iter().map(|[a, b]| (*a, *b)).collect())
    }

    /// Capabilities advertised by the fake backend.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::device(
            self.name.clone(),
            self.num_qubits,
            GateSet::from_basis(&self.basis_gates),
            self.topology(),
        )
        .with_features(["noise_model", "expectation_values"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_snapshots_load() {
        for name in DEVICE_NAMES {
            let snapshot = DeviceSnapshot::load(name).unwrap();
            assert_eq!(snapshot.name, name);
            assert_eq!(snapshot.readout_error.len(), snapshot.num_qubits as usize);
        }
    }

    #[test]
    fn test_manila_shape() {
        let manila = DeviceSnapshot::load("fake_manila").unwrap();
        assert_eq!(manila.num_qubits, 5);
        let topology = manila.topology();
        assert!(topology.is_connected(1, 0));
        assert!(!topology.is_connected(0, 2));

        let caps = manila.capabilities();
        assert!(!caps.is_simulator);
        assert!(caps.gate_set.is_native("sx"));
        assert!(!caps.gate_set.is_native("h"));
    }

    #[test]
    fn test_almaden_shape() {
        let almaden = DeviceSnapshot::load("fake_almaden").unwrap();
        assert_eq!(almaden.num_qubits, 20);
        assert_eq!(almaden.coupling_map.len(), 24);
        assert!(almaden.topology().is_connected(1, 6));
    }

    #[test]
    fn test_unknown_device() {
        assert!(matches!(
            DeviceSnapshot::load("fake_nowhere"),
            Err(HalError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_snapshot() {
        let raw = r#"{
            "name": "broken", "version": "0", "num_qubits": 2,
            "basis_gates": ["cx"], "coupling_map": [[0, 2]],
            "readout_error": [0.01, 0.01], "gate_error_1q": 0.0, "gate_error_2q": 0.0
        }"#;
        assert!(matches!(
            DeviceSnapshot::from_json(raw),
            Err(HalError::Configuration(_))
        ));
    }
}
