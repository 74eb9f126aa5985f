//! The estimating primitive.
//!
//! Two strategies are available:
//!
//! - **approximation** (default): the backend computes the exact expectation
//!   value and the primitive adds Gaussian shot noise whose variance matches
//!   `shots` independent measurements of the observable.
//! - **sampling**: each Pauli term is measured in its eigenbasis and the
//!   value is assembled from parities of the sampled outcomes.
//!
//! Backends that cannot compute exact values are sampled automatically.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, instrument, warn};

use qrt_hal::{Backend, DEFAULT_SHOTS, HalError, RunOptions};
use qrt_ir::{Circuit, Pauli, PauliString, QubitId, SparsePauliOp};

use crate::error::{RuntimeError, RuntimeResult};
use crate::job::RuntimeJob;
use crate::result::{EstimatorMetadata, EstimatorResult, MAX_OUTCOME_BITS};
use crate::target::BackendTarget;

const SIMPLIFY_TOLERANCE: f64 = 1e-12;

/// Options of an [`Estimator`].
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorOptions {
    /// Shots used when `run` is not given any.
    pub default_shots: u32,
    /// Seed for shot noise and sampling; random when unset.
    pub seed_simulator: Option<u64>,
    /// Use exact values plus shot noise instead of sampling.
    pub approximation: bool,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            default_shots: DEFAULT_SHOTS,
            seed_simulator: None,
            approximation: true,
        }
    }
}

/// Estimates expectation values of observables in circuit states.
pub struct Estimator {
    backend: Arc<dyn Backend>,
    options: EstimatorOptions,
}

impl Estimator {
    /// An estimator on `target` with default options.
    pub fn new(target: impl Into<BackendTarget>) -> RuntimeResult<Self> {
        Ok(Self {
            backend: target.into().resolve()?,
            options: EstimatorOptions::default(),
        })
    }

    /// Replace the options.
    pub fn with_options(mut self, options: EstimatorOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in use.
    pub fn options(&self) -> &EstimatorOptions {
        &self.options
    }

    /// The backend circuits run on.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Estimate `observables[i]` on `circuits[i]`.
    ///
    /// A single observable is paired with every circuit. Widths must agree.
    #[instrument(skip(self, circuits, observables), fields(backend = %self.backend.name()))]
    pub fn run(
        &self,
        circuits: &[Circuit],
        observables: &[SparsePauliOp],
        shots: Option<u32>,
    ) -> RuntimeResult<RuntimeJob<EstimatorResult>> {
        let shots = shots.unwrap_or(self.options.default_shots);
        if circuits.is_empty() {
            return Err(RuntimeError::InvalidArgument("no circuits given".into()));
        }
        if shots == 0 {
            return Err(RuntimeError::InvalidArgument(
                "shots must be positive".into(),
            ));
        }
        let observables: Vec<SparsePauliOp> = match observables.len() {
            1 => vec![observables[0].clone(); circuits.len()],
            n if n == circuits.len() => observables.to_vec(),
            n => {
                return Err(RuntimeError::InvalidArgument(format!(
                    "{} circuits but {n} observables",
                    circuits.len()
                )));
            }
        };
        for (circuit, observable) in circuits.iter().zip(&observables) {
            if circuit.num_qubits() != observable.num_qubits() {
                return Err(RuntimeError::InvalidArgument(format!(
                    "observable acts on {} qubits but circuit '{}' has {}",
                    observable.num_qubits(),
                    circuit.name(),
                    circuit.num_qubits()
                )));
            }
        }

        let backend = Arc::clone(&self.backend);
        let pairs: Vec<(Circuit, SparsePauliOp)> =
            circuits.iter().cloned().zip(observables).collect();
        let approximation = self.options.approximation;
        let seed = self.options.seed_simulator.unwrap_or_else(rand::random);

        RuntimeJob::spawn(self.backend.name(), async move {
            let mut values = Vec::with_capacity(pairs.len());
            let mut metadata = Vec::with_capacity(pairs.len());
            for ((circuit, observable), i) in pairs.iter().zip(0u64..) {
                let seed = seed.wrapping_add(i);
                let (value, meta) =
                    estimate_one(&*backend, circuit, observable, shots, seed, approximation)
                        .await?;
                values.push(value);
                metadata.push(meta);
            }
            Ok(EstimatorResult { values, metadata })
        })
    }
}

async fn estimate_one(
    backend: &dyn Backend,
    circuit: &Circuit,
    observable: &SparsePauliOp,
    shots: u32,
    seed: u64,
    approximation: bool,
) -> RuntimeResult<(f64, EstimatorMetadata)> {
    if approximation {
        match approximate(backend, circuit, observable, shots, seed).await {
            Err(RuntimeError::Hal(HalError::Unsupported(reason))) => {
                warn!(
                    "{} cannot estimate exactly ({}), sampling instead",
                    backend.name(),
                    reason
                );
            }
            other => return other,
        }
    }
    sample(backend, circuit, observable, shots, seed).await
}

async fn approximate(
    backend: &dyn Backend,
    circuit: &Circuit,
    observable: &SparsePauliOp,
    shots: u32,
    seed: u64,
) -> RuntimeResult<(f64, EstimatorMetadata)> {
    let squared = observable.compose(observable)?.simplify(SIMPLIFY_TOLERANCE);
    let exact = backend
        .estimate(circuit, &[observable.clone(), squared])
        .await?;
    let (mean, second_moment) = match exact.values.as_slice() {
        [mean, second_moment] => (*mean, *second_moment),
        other => {
            return Err(RuntimeError::JobFailed(format!(
                "expected 2 expectation values, got {}",
                other.len()
            )));
        }
    };

    let variance = (second_moment - mean * mean).max(0.0);
    let std_dev = (variance / f64::from(shots)).sqrt();
    let shot_noise = Normal::new(mean, std_dev)
        .map_err(|e| RuntimeError::JobFailed(format!("invalid shot-noise distribution: {e}")))?;
    let value = shot_noise.sample(&mut StdRng::seed_from_u64(seed));
    debug!(
        "Approximated <O> = {:.6} (exact {:.6}, variance {:.6}) on '{}'",
        value,
        mean,
        variance,
        circuit.name()
    );

    Ok((
        value,
        EstimatorMetadata {
            shots,
            variance,
            simulator_metadata: Some(exact.metadata),
        },
    ))
}

async fn sample(
    backend: &dyn Backend,
    circuit: &Circuit,
    observable: &SparsePauliOp,
    shots: u32,
    seed: u64,
) -> RuntimeResult<(f64, EstimatorMetadata)> {
    let mut base = circuit.clone();
    base.remove_final_measurements();

    let mut value = 0.0;
    let mut variance = 0.0;
    let mut circuits = vec![];
    let mut measured = vec![];
    for (pauli, coeff) in observable.terms() {
        if pauli.is_identity() {
            value += coeff.re;
            continue;
        }
        let (term_circuit, mask) = measurement_circuit(&base, pauli)?;
        circuits.push(term_circuit);
        measured.push((coeff, mask));
    }

    let mut simulator_metadata = None;
    if !circuits.is_empty() {
        let options = RunOptions::new(shots).with_seed(seed);
        let job_id = backend.submit(&circuits, &options).await?;
        let result = backend.wait(&job_id).await?;
        for ((coeff, mask), exp) in measured.into_iter().zip(&result.results) {
            let total = exp.counts.total_shots();
            if total == 0 {
                continue;
            }
            let signed: i64 = exp
                .counts
                .int_outcomes()
                .into_iter()
                .map(|(outcome, n)| {
                    let n = n as i64;
                    if (outcome & mask).count_ones() % 2 == 0 { n } else { -n }
                })
                .sum();
            let expectation = signed as f64 / total as f64;
            value += coeff.re * expectation;
            variance += coeff.norm_sqr() * (1.0 - expectation * expectation);
        }
        simulator_metadata = result.results.first().map(|exp| exp.metadata.clone());
        debug!(
            "Sampled {} Pauli term(s) of '{}' with {} shots each",
            circuits.len(),
            circuit.name(),
            shots
        );
    }

    Ok((
        value,
        EstimatorMetadata {
            shots,
            variance,
            simulator_metadata,
        },
    ))
}

/// `base` rotated into the eigenbasis of `pauli`, with its support measured
/// into a fresh register. Returns the circuit and the outcome mask of that
/// register.
fn measurement_circuit(base: &Circuit, pauli: &PauliString) -> RuntimeResult<(Circuit, u64)> {
    let mut circuit = base.clone().with_name(format!("{}_{pauli}", base.name()));
    let support: Vec<_> = pauli.support().collect();
    let register = circuit.add_creg("obs", support.len() as u32);

    let mut mask = 0u64;
    for ((qubit, op), clbit) in support.into_iter().zip(register) {
        if clbit.index() >= MAX_OUTCOME_BITS {
            return Err(RuntimeError::InvalidArgument(format!(
                "circuit '{}' has too many classical bits to sample observables",
                base.name()
            )));
        }
        let qubit = QubitId(qubit as u32);
        match op {
            Pauli::X => {
                circuit.h(qubit)?;
            }
            Pauli::Y => {
                circuit.sdg(qubit)?.h(qubit)?;
            }
            Pauli::Z | Pauli::I => {}
        }
        circuit.measure(qubit, clbit)?;
        mask |= 1 << clbit.index();
    }
    Ok((circuit, mask))
}

#[cfg(all(test, feature = "local-simulator"))]
mod tests {
    use super::*;
    use qrt_adapter_fake::FakeBackend;
    use qrt_adapter_sim::LocalSimulator;
    use qrt_ir::reference;

    fn sampling() -> EstimatorOptions {
        EstimatorOptions {
            seed_simulator: Some(11),
            approximation: false,
            ..EstimatorOptions::default()
        }
    }

    #[tokio::test]
    async fn test_bell_zz_is_exact() {
        let estimator = Estimator::new(LocalSimulator::new()).unwrap();
        let result = estimator
            .run(
                &[reference::bell().unwrap()],
                &[SparsePauliOp::from_label("ZZ").unwrap()],
                Some(100),
            )
            .unwrap()
            .result()
            .await
            .unwrap();
        assert!((result.values[0] - 1.0).abs() < 1e-9);
        assert_eq!(result.metadata[0].shots, 100);
        assert!(result.metadata[0].variance.abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_shot_noise_is_seeded() {
        // <X> = 0 with variance 1 for |0>.
        let circuit = Circuit::with_size("zero", 1, 0);
        let observable = SparsePauliOp::from_label("X").unwrap();
        let estimator = Estimator::new(LocalSimulator::new())
            .unwrap()
            .with_options(EstimatorOptions {
                seed_simulator: Some(3),
                ..EstimatorOptions::default()
            });

        let first = estimator
            .run(&[circuit.clone()], &[observable.clone()], Some(10_000))
            .unwrap()
            .result()
            .await
            .unwrap();
        let second = estimator
            .run(&[circuit], &[observable], Some(10_000))
            .unwrap()
            .result()
            .await
            .unwrap();
        assert_eq!(first.values, second.values);
        assert!((first.metadata[0].variance - 1.0).abs() < 1e-9);
        // Five standard deviations of 1/sqrt(10000).
        assert!(first.values[0].abs() < 0.05);
    }

    #[tokio::test]
    async fn test_sampled_agrees_with_exact() {
        let mut circuit = Circuit::with_size("state", 2, 0);
        circuit
            .ry(0.7, QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .rx(0.4, QubitId(1))
            .unwrap();
        let observable =
            SparsePauliOp::from_list([("ZZ", 1.0), ("XI", 0.5), ("IY", -0.3), ("II", 0.2)])
                .unwrap();

        let exact = Estimator::new(LocalSimulator::new())
            .unwrap()
            .with_options(EstimatorOptions {
                seed_simulator: Some(1),
                ..EstimatorOptions::default()
            })
            .run(&[circuit.clone()], &[observable.clone()], Some(1_000_000))
            .unwrap()
            .result()
            .await
            .unwrap();
        let sampled = Estimator::new(LocalSimulator::new())
            .unwrap()
            .with_options(sampling())
            .run(&[circuit], &[observable], Some(20_000))
            .unwrap()
            .result()
            .await
            .unwrap();
        assert!((exact.values[0] - sampled.values[0]).abs() < 0.05);
        assert!(sampled.metadata[0].variance > 0.0);
    }

    #[tokio::test]
    async fn test_sampling_strips_final_measurements() {
        let estimator = Estimator::new(LocalSimulator::new())
            .unwrap()
            .with_options(sampling());
        let result = estimator
            .run(
                &[reference::bell().unwrap()],
                &[SparsePauliOp::from_list([("ZZ", 1.0), ("XX", 1.0)]).unwrap()],
                Some(500),
            )
            .unwrap()
            .result()
            .await
            .unwrap();
        assert!((result.values[0] - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_identity_only_needs_no_backend_run() {
        let estimator = Estimator::new(FakeBackend::manila())
            .unwrap()
            .with_options(sampling());
        let result = estimator
            .run(
                &[Circuit::with_size("idle", 5, 0)],
                &[SparsePauliOp::identity(5).scale(3.0)],
                Some(10),
            )
            .unwrap()
            .result()
            .await
            .unwrap();
        assert_eq!(result.values, vec![3.0]);
        assert_eq!(result.metadata[0].variance, 0.0);
    }

    #[tokio::test]
    async fn test_broadcast_and_width_checks() {
        let estimator = Estimator::new("fake_manila").unwrap();
        let zz = SparsePauliOp::from_label("ZZ").unwrap();
        let bells = [reference::bell().unwrap(), reference::bell().unwrap()];

        let result = estimator
            .run(&bells, std::slice::from_ref(&zz), Some(50))
            .unwrap()
            .result()
            .await
            .unwrap();
        assert_eq!(result.values.len(), 2);

        assert!(matches!(
            estimator.run(&bells, &[zz.clone(), zz.clone(), zz.clone()], Some(50)),
            Err(RuntimeError::InvalidArgument(_))
        ));
        assert!(matches!(
            estimator.run(
                &[reference::ghz(3).unwrap()],
                std::slice::from_ref(&zz),
                Some(50)
            ),
            Err(RuntimeError::InvalidArgument(_))
        ));
        assert!(matches!(
            estimator.run(&bells, std::slice::from_ref(&zz), Some(0)),
            Err(RuntimeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_measurement_circuit_rotates_basis() {
        let base = Circuit::with_size("base", 3, 1);
        let pauli = PauliString::from_label("YIX").unwrap();
        let (circuit, mask) = measurement_circuit(&base, &pauli).unwrap();

        assert_eq!(circuit.name(), "base_YIX");
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(mask, 0b110);
        // H on q0; Sdg, H on q2; two measurements.
        assert_eq!(circuit.instructions().len(), 5);
        assert_eq!(circuit.measured_qubits(), vec![QubitId(0), QubitId(2)]);
    }
}
