//! Fake device backend implementation.

use async_trait::async_trait;
use tracing::{debug, instrument};

use qrt_adapter_sim::LocalSimulator;
use qrt_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    ExpectationResult, HalError, HalResult, JobId, JobStatus, RunOptions, ValidationResult,
};
use qrt_ir::{Circuit, SparsePauliOp};

use crate::device::DeviceSnapshot;

/// A mock device: real shape and calibration data, simulated locally.
///
/// Circuits run on a [`LocalSimulator`] loaded with the device's noise
/// model. No routing is done: gates outside the basis and two-qubit gates
/// on uncoupled pairs still execute, as if a transpiler had mapped them
/// ideally. [`Backend::validate`] reports them as `RequiresTranspilation`.
pub struct FakeBackend {
    snapshot: DeviceSnapshot,
    capabilities: Capabilities,
    simulator: LocalSimulator,
}

impl FakeBackend {
    /// Build a backend from a device snapshot.
    pub fn from_snapshot(snapshot: DeviceSnapshot) -> Self {
        let simulator = LocalSimulator::new()
            .named(snapshot.name.clone())
            .qubit_limit(snapshot.num_qubits)
            .noise(snapshot.noise_model());
        Self {
            capabilities: snapshot.capabilities(),
            snapshot,
            simulator,
        }
    }

    /// Look up a bundled device by name.
    pub fn from_name(name: &str) -> HalResult<Self> {
        DeviceSnapshot::load(name).map(Self::from_snapshot)
    }

    /// 5-qubit linear device.
    pub fn manila() -> Self {
        Self::bundled("fake_manila")
    }

    /// 5-qubit T-shaped device.
    pub fn lima() -> Self {
        Self::bundled("fake_lima")
    }

    /// 5-qubit T-shaped device.
    pub fn quito() -> Self {
        Self::bundled("fake_quito")
    }

    /// 20-qubit heavy-square device.
    pub fn almaden() -> Self {
        Self::bundled("fake_almaden")
    }

    fn bundled(name: &str) -> Self {
        // An unreadable bundled snapshot degrades to an ideal simulator.
        match Self::from_name(name) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!("bundled snapshot {name} failed to load: {e}");
                let simulator = LocalSimulator::new().named(name);
                Self {
                    capabilities: simulator.capabilities().clone(),
                    snapshot: DeviceSnapshot {
                        name: name.to_string(),
                        version: String::new(),
                        num_qubits: simulator.capabilities().num_qubits,
                        basis_gates: vec![],
                        coupling_map: vec![],
                        readout_error: vec![],
                        gate_error_1q: 0.0,
                        gate_error_2q: 0.0,
                    },
                    simulator,
                }
            }
        }
    }

    /// The snapshot this backend was built from.
    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    /// The simulator that executes circuits for this device.
    pub fn simulator(&self) -> &LocalSimulator {
        &self.simulator
    }

    fn check_width(&self, circuit: &Circuit) -> HalResult<()> {
        if circuit.num_qubits() > self.snapshot.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but {} only has {}",
                circuit.num_qubits(),
                self.snapshot.name,
                self.snapshot.num_qubits
            )));
        }
        Ok(())
    }

    /// What a transpiler would have to fix before the circuit matches the
    /// device. Empty when nothing needs to change.
    fn transpilation_needs(&self, circuit: &Circuit) -> Vec<String> {
        let gate_set = &self.capabilities.gate_set;
        let topology = &self.capabilities.topology;

        let mut non_native: Vec<&str> = vec![];
        let mut uncoupled: Vec<(u32, u32)> = vec![];
        for inst in circuit.instructions() {
            if !inst.is_gate() {
                continue;
            }
            let name = inst.name();
            if !gate_set.is_native(name) && !non_native.contains(&name) {
                non_native.push(name);
            }
            if let [a, b] = inst.qubits.as_slice() {
                let pair = (a.0, b.0);
                if !topology.is_connected(pair.0, pair.1) && !uncoupled.contains(&pair) {
                    uncoupled.push(pair);
                }
            }
        }

        let mut needs = vec![];
        if !non_native.is_empty() {
            needs.push(format!(
                "gates outside the {} basis: {}",
                self.snapshot.name,
                non_native.join(", ")
            ));
        }
        if !uncoupled.is_empty() {
            let pairs: Vec<String> = uncoupled
                .iter()
                .map(|(a, b)| format!("({a}, {b})"))
                .collect();
            needs.push(format!("two-qubit gates on uncoupled qubits: {}", pairs.join(", ")));
        }
        needs
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn name(&self) -> &str {
        &self.snapshot.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        if let Err(e) = self.check_width(circuit) {
            return Ok(ValidationResult::Invalid {
                reasons: vec![e.to_string()],
            });
        }
        if let ValidationResult::Invalid { reasons } = self.simulator.validate(circuit).await? {
            return Ok(ValidationResult::Invalid { reasons });
        }
        let needs = self.transpilation_needs(circuit);
        if needs.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::RequiresTranspilation {
                details: needs.join("; "),
            })
        }
    }

    #[instrument(skip(self, circuits, options), fields(device = %self.snapshot.name))]
    async fn submit(&self, circuits: &[Circuit], options: &RunOptions) -> HalResult<JobId> {
        for circuit in circuits {
            self.check_width(circuit)?;
            let needs = self.transpilation_needs(circuit);
            if !needs.is_empty() {
                debug!(
                    "Running '{}' with ideal routing: {}",
                    circuit.name(),
                    needs.join("; ")
                );
            }
        }
        self.simulator.submit(circuits, options).await
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.simulator.status(job_id).await
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.simulator.result(job_id).await
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.simulator.cancel(job_id).await
    }

    async fn estimate(
        &self,
        circuit: &Circuit,
        observables: &[SparsePauliOp],
    ) -> HalResult<ExpectationResult> {
        self.check_width(circuit)?;
        self.simulator.estimate(circuit, observables).await
    }
}

impl BackendFactory for FakeBackend {
    /// Reads the device from `extra["device"]`, falling back to the
    /// configured name.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let device = config.extra_str("device").unwrap_or(&config.name);
        Self::from_name(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrt_hal::{BackendExt, SimulationMethod};
    use qrt_ir::{QubitId, reference};

    #[tokio::test]
    async fn test_fake_capabilities() {
        let backend = FakeBackend::manila();
        assert_eq!(backend.name(), "fake_manila");
        let caps = backend.capabilities();
        assert_eq!(caps.num_qubits, 5);
        assert!(!caps.is_simulator);
        assert!(caps.has_feature("noise_model"));
        assert!(backend.availability().await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_noisy_bell_counts() {
        let backend = FakeBackend::almaden();
        let job = backend
            .run(&[reference::bell().unwrap()], &RunOptions::new(2000).with_seed(11))
            .await
            .unwrap();
        let result = job.result().await.unwrap();
        let exp = &result.results[0];
        assert_eq!(result.backend_name, "fake_almaden");
        assert!(exp.metadata.noise);

        let correlated = exp.counts.get("00") + exp.counts.get("11");
        let ratio = correlated as f64 / 2000.0;
        // Readout error alone leaves a few percent in 01/10.
        assert!(ratio > 0.85 && ratio < 1.0, "correlated ratio {ratio}");
    }

    #[tokio::test]
    async fn test_direct_run_metadata() {
        let backend = FakeBackend::almaden();
        let options = RunOptions::new(100)
            .with_seed(123)
            .with_method(SimulationMethod::Statevector);
        let job = backend
            .run(&[reference::bell().unwrap()], &options)
            .await
            .unwrap();
        let result = job.result().await.unwrap();
        assert_eq!(result.results[0].shots, 100);
        assert_eq!(result.results[0].seed_simulator, 123);
        assert_eq!(result.results[0].metadata.method, SimulationMethod::Statevector);
    }

    #[tokio::test]
    async fn test_validate_reports_transpilation() {
        let backend = FakeBackend::manila();

        // H is not native on manila.
        let bell = reference::bell().unwrap();
        match backend.validate(&bell).await.unwrap() {
            ValidationResult::RequiresTranspilation { details } => {
                assert!(details.ends_with("basis: h"), "{details}");
            }
            other => panic!("expected RequiresTranspilation, got {other:?}"),
        }

        // CX on 0 and 2 is not coupled on a line.
        let mut circuit = Circuit::with_size("far", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        match backend.validate(&circuit).await.unwrap() {
            ValidationResult::RequiresTranspilation { details } => {
                assert!(details.contains("(0, 2)"));
            }
            other => panic!("expected RequiresTranspilation, got {other:?}"),
        }

        let mut native = Circuit::with_size("native", 2, 0);
        native
            .sx(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap();
        assert!(backend.validate(&native).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_too_wide_for_device() {
        let backend = FakeBackend::lima();
        let circuit = reference::ghz(6).unwrap();
        assert!(!backend.validate(&circuit).await.unwrap().is_runnable());
        let result = backend.submit(&[circuit], &RunOptions::new(10)).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[tokio::test]
    async fn test_estimate_is_ideal() {
        let backend = FakeBackend::quito();
        let zz = SparsePauliOp::from_label("ZZ").unwrap();
        let estimate = backend
            .estimate(&reference::bell().unwrap(), &[zz])
            .await
            .unwrap();
        assert!((estimate.values[0] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_from_config() {
        let backend = FakeBackend::from_config(BackendConfig::new("fake_lima")).unwrap();
        assert_eq!(backend.name(), "fake_lima");

        let config = BackendConfig::new("mock")
            .with_extra("device", serde_json::json!("fake_quito"));
        assert_eq!(FakeBackend::from_config(config).unwrap().name(), "fake_quito");

        assert!(FakeBackend::from_config(BackendConfig::new("fake_nowhere")).is_err());
    }
}
