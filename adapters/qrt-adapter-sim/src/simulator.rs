//! Simulator backend implementation.

use async_trait::async_trait;
use chrono::Utc;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use qrt_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    ExpectationResult, ExperimentMetadata, HalError, HalResult, Job, JobId, JobStatus, RunOptions,
    SimulationMethod, ValidationResult,
};
use qrt_ir::{Circuit, SparsePauliOp};

use crate::executor::{Experiment, expectation_values, run_experiment};
use crate::noise::NoiseModel;

/// Qubit limit of the dense statevector-family methods.
pub const DEFAULT_MAX_QUBITS: u32 = 24;
/// Qubit limit of the density-matrix method.
pub const DENSITY_MATRIX_MAX_QUBITS: u32 = 12;
/// Qubit limit of the stabilizer method.
pub const STABILIZER_MAX_QUBITS: u32 = 1000;
/// Largest accepted shot count.
pub const MAX_SHOTS: u32 = 1_000_000;

const DEFAULT_NAME: &str = "local_simulator";

/// A finished job waiting for its result to be collected.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local simulator backend.
///
/// Runs circuits on one of three engines: a dense statevector, a density
/// matrix with exact noise channels, or a Clifford stabilizer tableau.
/// `extended_stabilizer` and `matrix_product_state` are accepted and run
/// exactly on the statevector kernels. With [`SimulationMethod::Automatic`]
/// the engine is chosen per circuit, see [`LocalSimulator::resolve_method`].
pub struct LocalSimulator {
    config: BackendConfig,
    capabilities: Capabilities,
    method: SimulationMethod,
    noise: Option<NoiseModel>,
    max_qubits: u32,
    seed_simulator: Option<u64>,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
}

impl LocalSimulator {
    /// Create a noiseless simulator with automatic method selection.
    pub fn new() -> Self {
        Self::build(
            BackendConfig::new(DEFAULT_NAME),
            SimulationMethod::Automatic,
            None,
            DEFAULT_MAX_QUBITS,
            None,
        )
    }

    /// Create a simulator that runs every circuit with `method` unless a
    /// run overrides it.
    pub fn with_method(method: SimulationMethod) -> Self {
        Self::new().method(method)
    }

    /// Create a simulator with a custom dense-method qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::new().qubit_limit(max_qubits)
    }

    /// Create a simulator that applies `noise` to every run.
    pub fn with_noise(noise: NoiseModel) -> Self {
        Self::new().noise(noise)
    }

    fn build(
        config: BackendConfig,
        method: SimulationMethod,
        noise: Option<NoiseModel>,
        max_qubits: u32,
        seed_simulator: Option<u64>,
    ) -> Self {
        let capabilities = simulator_capabilities(&config.name, max_qubits, noise.as_ref());
        Self {
            config,
            capabilities,
            method,
            noise,
            max_qubits,
            seed_simulator,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    fn refresh_capabilities(&mut self) {
        self.capabilities =
            simulator_capabilities(&self.config.name, self.max_qubits, self.noise.as_ref());
    }

    /// Set the default simulation method.
    pub fn method(mut self, method: SimulationMethod) -> Self {
        self.method = method;
        self
    }

    /// Attach a noise model.
    pub fn noise(mut self, noise: NoiseModel) -> Self {
        self.noise = Some(noise);
        self.refresh_capabilities();
        self
    }

    /// Default seed, used when a run does not set one.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed_simulator = Some(seed);
        self
    }

    /// Rename the backend.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self.refresh_capabilities();
        self
    }

    /// Set the qubit limit of the dense methods.
    pub fn qubit_limit(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits;
        self.refresh_capabilities();
        self
    }

    /// The configured default method.
    pub fn default_method(&self) -> SimulationMethod {
        self.method
    }

    /// The attached noise model, if any.
    pub fn noise_model(&self) -> Option<&NoiseModel> {
        self.noise.as_ref()
    }

    fn is_noisy(&self) -> bool {
        self.noise.as_ref().is_some_and(|n| !n.is_ideal())
    }

    /// The engine that will run `circuit`.
    ///
    /// `requested` overrides the configured method. `Automatic` picks the
    /// stabilizer for Clifford circuits, the density matrix for noisy
    /// circuits small enough to hold one, and the statevector otherwise.
    pub fn resolve_method(
        &self,
        circuit: &Circuit,
        requested: Option<SimulationMethod>,
    ) -> SimulationMethod {
        resolve(
            requested.unwrap_or(self.method),
            circuit,
            self.is_noisy(),
        )
    }

    /// Largest circuit `method` accepts.
    pub fn qubit_limit_for(&self, method: SimulationMethod) -> u32 {
        match method {
            SimulationMethod::Stabilizer => STABILIZER_MAX_QUBITS,
            SimulationMethod::DensityMatrix => self.max_qubits.min(DENSITY_MATRIX_MAX_QUBITS),
            _ => self.max_qubits,
        }
    }

    /// Every reason `circuit` cannot run with `method`.
    fn check_circuit(&self, circuit: &Circuit, method: SimulationMethod) -> Vec<String> {
        let mut reasons = vec![];
        let limit = self.qubit_limit_for(method);
        if circuit.num_qubits() > limit as usize {
            reasons.push(format!(
                "circuit '{}' has {} qubits but method {} supports at most {}",
                circuit.name(),
                circuit.num_qubits(),
                method,
                limit
            ));
        }
        let unbound = circuit.parameters();
        if !unbound.is_empty() {
            reasons.push(format!(
                "circuit '{}' has unbound parameters: {}",
                circuit.name(),
                unbound.join(", ")
            ));
        }
        if method == SimulationMethod::Stabilizer && !circuit.is_clifford() {
            reasons.push(format!(
                "circuit '{}' contains non-Clifford gates and cannot run on the stabilizer method",
                circuit.name()
            ));
        }
        reasons
    }

    fn ensure_runnable(&self, circuit: &Circuit, method: SimulationMethod) -> HalResult<()> {
        let limit = self.qubit_limit_for(method);
        if circuit.num_qubits() > limit as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but method {} only supports {}",
                circuit.num_qubits(),
                method,
                limit
            )));
        }
        match self.check_circuit(circuit, method).into_iter().next() {
            Some(reason) => Err(HalError::InvalidCircuit(reason)),
            None => Ok(()),
        }
    }

    /// Run a batch synchronously.
    #[instrument(skip(self, circuits, methods))]
    fn run_simulation(
        &self,
        job_id: &JobId,
        circuits: &[Circuit],
        methods: &[SimulationMethod],
        shots: u32,
        seed: u64,
        memory: bool,
    ) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let results = circuits
            .iter()
            .zip(methods)
            .enumerate()
            .map(|(i, (circuit, &method))| {
                run_experiment(&Experiment {
                    circuit,
                    method,
                    noise: self.noise.as_ref(),
                    shots,
                    seed: seed.wrapping_add(i as u64),
                    memory,
                })
            })
            .collect::<HalResult<Vec<_>>>()?;

        Ok(ExecutionResult {
            backend_name: self.config.name.clone(),
            job_id: job_id.clone(),
            success: results.iter().all(|r| r.success),
            time_taken: start.elapsed().as_secs_f64(),
            results,
        })
    }
}

impl Default for LocalSimulator {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(requested: SimulationMethod, circuit: &Circuit, noisy: bool) -> SimulationMethod {
    match requested {
        SimulationMethod::Automatic => {
            if circuit.is_clifford() {
                SimulationMethod::Stabilizer
            } else if noisy && circuit.num_qubits() <= DENSITY_MATRIX_MAX_QUBITS as usize {
                SimulationMethod::DensityMatrix
            } else {
                SimulationMethod::Statevector
            }
        }
        method => method,
    }
}

fn simulator_capabilities(name: &str, max_qubits: u32, noise: Option<&NoiseModel>) -> Capabilities {
    let mut features: Vec<&str> = SimulationMethod::ALL[1..]
        .iter()
        .map(|m| m.as_str())
        .collect();
    features.extend(["mid_circuit_measurement", "reset", "expectation_values"]);
    if noise.is_some() {
        features.push("noise_model");
    }
    Capabilities::simulator(name, max_qubits)
        .with_max_shots(MAX_SHOTS)
        .with_features(features)
}

#[async_trait]
impl Backend for LocalSimulator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let method = self.resolve_method(circuit, None);
        let reasons = self.check_circuit(circuit, method);
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuits, options))]
    async fn submit(&self, circuits: &[Circuit], options: &RunOptions) -> HalResult<JobId> {
        if circuits.is_empty() {
            return Err(HalError::InvalidCircuit("no circuits submitted".into()));
        }
        if options.shots == 0 || options.shots > MAX_SHOTS {
            return Err(HalError::InvalidShots(format!(
                "shots must be between 1 and {MAX_SHOTS}, got {}",
                options.shots
            )));
        }
        if let Some(noise) = &self.noise {
            noise.validate()?;
        }

        let methods: Vec<SimulationMethod> = circuits
            .iter()
            .map(|c| self.resolve_method(c, options.method))
            .collect();
        for (circuit, &method) in circuits.iter().zip(&methods) {
            self.ensure_runnable(circuit, method)?;
        }

        let seed = options
            .seed_simulator
            .or(self.seed_simulator)
            .unwrap_or_else(rand::random);

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let submitted_at = Utc::now();
        debug!(
            "Submitted job {}: {} circuit(s), {} shots, seed {}",
            job_id,
            circuits.len(),
            options.shots,
            seed
        );

        let (status, result) = match self.run_simulation(
            &job_id,
            circuits,
            &methods,
            options.shots,
            seed,
            options.memory,
        ) {
            Ok(result) => (JobStatus::Completed, Some(result)),
            Err(e) => {
                warn!("Job {} failed: {}", job_id, e);
                (JobStatus::Failed(e.to_string()), None)
            }
        };
        let job = Job::finished(job_id.clone(), self.config.name.clone(), submitted_at, status)
            .with_batch(circuits.len(), options.shots);

        self.jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(job_id.0.clone(), SimJob { job, result });

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let sim_job = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        debug!(
            "Collected job {} after {} ms",
            job_id,
            sim_job.job.elapsed().num_milliseconds()
        );
        match (sim_job.job.status, sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg)),
            (status, _) => Err(HalError::Backend(format!(
                "job {job_id} finished as {status} without a result"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if jobs.contains_key(&job_id.0) {
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }

    #[instrument(skip(self, circuit, observables))]
    async fn estimate(
        &self,
        circuit: &Circuit,
        observables: &[SparsePauliOp],
    ) -> HalResult<ExpectationResult> {
        // Expectation values are exact and noise-free.
        let method = resolve(self.method, circuit, false);
        self.ensure_runnable(circuit, method)?;
        let values = expectation_values(circuit, method, observables)?;
        debug!(
            "Estimated {} observable(s) on '{}' with {}",
            values.len(),
            circuit.name(),
            method
        );
        Ok(ExpectationResult {
            values,
            metadata: ExperimentMetadata {
                method,
                num_qubits: circuit.num_qubits(),
                num_clbits: circuit.num_clbits(),
                measure_sampling: false,
                noise: false,
            },
        })
    }
}

impl BackendFactory for LocalSimulator {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let method = config
            .extra_str("method")
            .map(str::parse::<SimulationMethod>)
            .transpose()?
            .unwrap_or_default();

        let max_qubits = match config.extra_u64("max_qubits") {
            Some(v) => u32::try_from(v).map_err(|_| {
                HalError::Configuration(format!("max_qubits out of range: {v}"))
            })?,
            None => DEFAULT_MAX_QUBITS,
        };

        let noise = config
            .extra
            .get("noise_model")
            .map(|v| serde_json::from_value::<NoiseModel>(v.clone()))
            .transpose()?;
        if let Some(noise) = &noise {
            noise.validate()?;
        }

        let seed_simulator = config.extra_u64("seed_simulator");
        Ok(Self::build(config, method, noise, max_qubits, seed_simulator))
    }
}
