//! The sampling primitive.

use std::sync::Arc;

use tracing::{debug, instrument};

use qrt_hal::{Backend, DEFAULT_SHOTS, ExecutionResult, RunOptions, SimulationMethod};
use qrt_ir::{Circuit, ParameterValues};

use crate::error::{RuntimeError, RuntimeResult};
use crate::job::RuntimeJob;
use crate::result::{MAX_OUTCOME_BITS, QuasiDistribution, SamplerMetadata, SamplerResult};
use crate::target::BackendTarget;

/// Options of a [`Sampler`].
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerOptions {
    /// Shots used when `run` is not given any.
    pub default_shots: u32,
    /// Simulator seed; random when unset.
    pub seed_simulator: Option<u64>,
    /// Simulation method override for simulator backends.
    pub method: Option<SimulationMethod>,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            default_shots: DEFAULT_SHOTS,
            seed_simulator: None,
            method: None,
        }
    }
}

/// Samples measurement outcomes of circuits and returns
/// quasi-probability distributions.
pub struct Sampler {
    backend: Arc<dyn Backend>,
    options: SamplerOptions,
}

impl Sampler {
    /// A sampler on `target` with default options.
    pub fn new(target: impl Into<BackendTarget>) -> RuntimeResult<Self> {
        Ok(Self {
            backend: target.into().resolve()?,
            options: SamplerOptions::default(),
        })
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SamplerOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in use.
    pub fn options(&self) -> &SamplerOptions {
        &self.options
    }

    /// The backend circuits run on.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Sample every circuit with `shots` shots (default from the options).
    #[instrument(skip(self, circuits), fields(backend = %self.backend.name()))]
    pub fn run(
        &self,
        circuits: &[Circuit],
        shots: Option<u32>,
    ) -> RuntimeResult<RuntimeJob<SamplerResult>> {
        let shots = shots.unwrap_or(self.options.default_shots);
        if circuits.is_empty() {
            return Err(RuntimeError::InvalidArgument("no circuits given".into()));
        }
        if shots == 0 {
            return Err(RuntimeError::InvalidArgument(
                "shots must be positive".into(),
            ));
        }
        if let Some(circuit) = circuits.iter().find(|c| !c.has_measurements()) {
            return Err(RuntimeError::NoMeasurements(circuit.name().to_string()));
        }
        if let Some(circuit) = circuits.iter().find(|c| c.num_clbits() > MAX_OUTCOME_BITS) {
            return Err(RuntimeError::InvalidArgument(format!(
                "circuit '{}' has {} classical bits; outcomes are limited to {}",
                circuit.name(),
                circuit.num_clbits(),
                MAX_OUTCOME_BITS
            )));
        }

        let mut options = RunOptions::new(shots);
        options.seed_simulator = self.options.seed_simulator;
        options.method = self.options.method;

        let backend = Arc::clone(&self.backend);
        let circuits = circuits.to_vec();
        RuntimeJob::spawn(self.backend.name(), async move {
            let job_id = backend.submit(&circuits, &options).await?;
            debug!("Sampler submitted job {} to {}", job_id, backend.name());
            let result = backend.wait(&job_id).await?;
            Ok(to_sampler_result(&result))
        })
    }

    /// Bind one set of parameter values per circuit, then sample.
    pub fn run_with_parameters(
        &self,
        circuits: &[Circuit],
        parameter_values: &[ParameterValues],
        shots: Option<u32>,
    ) -> RuntimeResult<RuntimeJob<SamplerResult>> {
        if circuits.len() != parameter_values.len() {
            return Err(RuntimeError::InvalidArgument(format!(
                "{} circuits but {} parameter sets",
                circuits.len(),
                parameter_values.len()
            )));
        }
        let bound = circuits
            .iter()
            .zip(parameter_values)
            .map(|(circuit, values)| circuit.bind_parameters(values))
            .collect::<Result<Vec<_>, _>>()?;
        self.run(&bound, shots)
    }
}

fn to_sampler_result(result: &ExecutionResult) -> SamplerResult {
    let quasi_dists = result
        .results
        .iter()
        .map(|exp| QuasiDistribution::from_counts(&exp.counts))
        .collect();
    let metadata = result
        .results
        .iter()
        .map(|exp| SamplerMetadata {
            shots: exp.shots,
            seed_simulator: exp.seed_simulator,
            simulator_metadata: exp.metadata.clone(),
        })
        .collect();
    SamplerResult {
        quasi_dists,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrt_ir::{ClbitId, ParameterExpression, QubitId, reference};
    use std::f64::consts::PI;

    #[tokio::test]
    async fn test_sampler_on_fake_backend() {
        let sampler = Sampler::new("fake_lima").unwrap().with_options(SamplerOptions {
            seed_simulator: Some(5),
            ..SamplerOptions::default()
        });
        let job = sampler.run(&[reference::bell().unwrap()], Some(400)).unwrap();
        assert_eq!(job.backend(), "fake_lima");
        let result = job.result().await.unwrap();
        assert!((result.quasi_dists[0][0] - 0.5).abs() < 0.15);
        assert!((result.quasi_dists[0][3] - 0.5).abs() < 0.15);
        assert_eq!(result.metadata[0].shots, 400);
        assert_eq!(result.metadata[0].seed_simulator, 5);
        assert!(result.metadata[0].simulator_metadata.noise);
    }

    #[tokio::test]
    async fn test_default_shots() {
        let sampler = Sampler::new("fake_quito").unwrap();
        let result = sampler
            .run(&[reference::bell().unwrap()], None)
            .unwrap()
            .result()
            .await
            .unwrap();
        assert_eq!(result.metadata[0].shots, DEFAULT_SHOTS);
    }

    #[tokio::test]
    async fn test_rejects_bad_arguments() {
        let sampler = Sampler::new("fake_manila").unwrap();
        assert!(matches!(
            sampler.run(&[], Some(10)),
            Err(RuntimeError::InvalidArgument(_))
        ));
        assert!(matches!(
            sampler.run(&[reference::bell().unwrap()], Some(0)),
            Err(RuntimeError::InvalidArgument(_))
        ));

        let unmeasured = Circuit::with_size("empty", 1, 0);
        assert!(matches!(
            sampler.run(&[unmeasured], Some(10)),
            Err(RuntimeError::NoMeasurements(_))
        ));
    }

    #[cfg(feature = "local-simulator")]
    #[tokio::test]
    async fn test_rejects_registers_wider_than_outcomes() {
        let sampler = Sampler::new(crate::LocalSimulator::new()).unwrap();
        let wide = reference::ghz(70).unwrap();
        assert!(matches!(
            sampler.run(&[wide], Some(10)),
            Err(RuntimeError::InvalidArgument(_))
        ));

        let widest = reference::ghz(MAX_OUTCOME_BITS as u32).unwrap();
        let result = sampler
            .run(&[widest], Some(10))
            .unwrap()
            .result()
            .await
            .unwrap();
        let total: f64 = result.quasi_dists[0].iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_run_with_parameters() {
        let mut circuit = Circuit::with_size("rx", 1, 1);
        circuit
            .rx(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        let sampler = Sampler::new("fake_manila").unwrap();
        let mut values = ParameterValues::default();
        values.insert("theta".into(), PI);
        let result = sampler
            .run_with_parameters(&[circuit.clone()], &[values], Some(200))
            .unwrap()
            .result()
            .await
            .unwrap();
        // Rx(π)|0⟩ = |1⟩ up to readout and gate noise.
        assert!(result.quasi_dists[0][1] > 0.9);

        assert!(matches!(
            sampler.run_with_parameters(&[circuit.clone()], &[], Some(10)),
            Err(RuntimeError::InvalidArgument(_))
        ));
        assert!(matches!(
            sampler.run_with_parameters(&[circuit], &[ParameterValues::default()], Some(10)),
            Err(RuntimeError::Ir(_))
        ));
    }

    #[test]
    fn test_run_outside_runtime() {
        let sampler = Sampler::new("fake_manila").unwrap();
        assert!(matches!(
            sampler.run(&[reference::bell().unwrap()], Some(10)),
            Err(RuntimeError::NoRuntime)
        ));
    }
}
