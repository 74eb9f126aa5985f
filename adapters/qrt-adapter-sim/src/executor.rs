//! Runs one circuit on one engine.
//!
//! Two strategies produce the counts:
//!
//! - **Measure sampling**: the circuit body runs once and every shot is
//!   drawn from the final state. Valid when all measurements are terminal
//!   and nothing before them is random (no gate noise, no reset), unless
//!   the engine represents noise and reset exactly.
//! - **Trajectories**: every shot replays the circuit on a fresh copy of
//!   the state, collapsing at each measurement.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use qrt_hal::{Counts, ExperimentMetadata, ExperimentResult, HalError, HalResult, SimulationMethod};
use qrt_ir::{Circuit, Gate, InstructionKind, SparsePauliOp};

use crate::density_matrix::DensityMatrix;
use crate::engine::SimulationEngine;
use crate::noise::NoiseModel;
use crate::stabilizer::StabilizerState;
use crate::statevector::Statevector;

/// Everything needed to run one experiment.
pub(crate) struct Experiment<'a> {
    pub circuit: &'a Circuit,
    /// Resolved method (never `Automatic`).
    pub method: SimulationMethod,
    pub noise: Option<&'a NoiseModel>,
    pub shots: u32,
    pub seed: u64,
    pub memory: bool,
}

struct Outcomes {
    counts: Counts,
    memory: Option<Vec<String>>,
    measure_sampling: bool,
}

/// Run an experiment with the engine matching its method.
pub(crate) fn run_experiment(experiment: &Experiment<'_>) -> HalResult<ExperimentResult> {
    let start = Instant::now();
    let n = experiment.circuit.num_qubits();
    debug!(
        "Starting simulation of '{}': {} qubits, {} shots, method {}",
        experiment.circuit.name(),
        n,
        experiment.shots,
        experiment.method
    );

    let outcomes = match experiment.method {
        SimulationMethod::Stabilizer => sample(StabilizerState::new(n), experiment)?,
        SimulationMethod::DensityMatrix => sample(DensityMatrix::new(n), experiment)?,
        _ => sample(Statevector::new(n), experiment)?,
    };

    let elapsed = start.elapsed();
    debug!("Simulation completed in {:?}", elapsed);

    Ok(ExperimentResult {
        name: experiment.circuit.name().to_string(),
        shots: experiment.shots,
        seed_simulator: experiment.seed,
        success: true,
        counts: outcomes.counts,
        memory: outcomes.memory,
        metadata: ExperimentMetadata {
            method: experiment.method,
            num_qubits: n,
            num_clbits: experiment.circuit.num_clbits(),
            measure_sampling: outcomes.measure_sampling,
            noise: experiment.noise.is_some_and(|m| !m.is_ideal()),
        },
        time_taken: elapsed.as_secs_f64(),
    })
}

/// Exact expectation values of `observables` after the unitary part of
/// `circuit`.
///
/// Final measurements are dropped first; anything non-unitary left over
/// (mid-circuit measurement or reset) is `Unsupported`.
pub(crate) fn expectation_values(
    circuit: &Circuit,
    method: SimulationMethod,
    observables: &[SparsePauliOp],
) -> HalResult<Vec<f64>> {
    let n = circuit.num_qubits();
    if let Some(bad) = observables.iter().find(|o| o.num_qubits() != n) {
        return Err(HalError::InvalidCircuit(format!(
            "observable acts on {} qubits but circuit '{}' has {}",
            bad.num_qubits(),
            circuit.name(),
            n
        )));
    }

    let mut body = circuit.clone();
    body.remove_final_measurements();
    if body
        .instructions()
        .iter()
        .any(|i| i.is_measure() || i.is_reset())
    {
        return Err(HalError::Unsupported(
            "exact expectation values need a circuit without mid-circuit measurement or reset"
                .into(),
        ));
    }

    match method {
        SimulationMethod::Stabilizer => evaluate(StabilizerState::new(n), &body, observables),
        SimulationMethod::DensityMatrix => evaluate(DensityMatrix::new(n), &body, observables),
        _ => evaluate(Statevector::new(n), &body, observables),
    }
}

fn evaluate<E: SimulationEngine>(
    mut state: E,
    body: &Circuit,
    observables: &[SparsePauliOp],
) -> HalResult<Vec<f64>> {
    for inst in body.instructions() {
        if let InstructionKind::Gate(gate) = &inst.kind {
            let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
            state.apply_gate(&gate.kind, &qubits)?;
        }
    }
    Ok(observables
        .iter()
        .map(|obs| {
            obs.terms()
                .iter()
                .map(|(pauli, coeff)| coeff.re * state.expectation(pauli))
                .sum()
        })
        .collect())
}

fn sample<E: SimulationEngine>(
    initial: E,
    experiment: &Experiment<'_>,
) -> HalResult<Outcomes> {
    let circuit = experiment.circuit;
    let mut rng = StdRng::seed_from_u64(experiment.seed);
    let noisy_gates = experiment.noise.is_some_and(NoiseModel::has_gate_errors);
    let has_reset = circuit.instructions().iter().any(|i| i.is_reset());

    let measure_sampling =
        circuit.measurements_are_final() && (E::EXACT_NOISE || (!noisy_gates && !has_reset));

    let mut counts = Counts::new();
    let mut memory = experiment.memory.then(Vec::new);
    let mut record = |bits: &[bool]| {
        let key = bitstring(bits);
        counts.increment(key.clone(), 1);
        if let Some(mem) = memory.as_mut() {
            mem.push(key);
        }
    };

    if measure_sampling {
        debug!("Using measure sampling for '{}'", circuit.name());
        let mut state = initial;
        let mut measures: Vec<(usize, usize)> = Vec::new();
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    apply_gate(&mut state, gate, &inst.qubits, experiment.noise, &mut rng)?;
                }
                InstructionKind::Measure => measures.extend(
                    inst.qubits
                        .iter()
                        .zip(&inst.clbits)
                        .map(|(q, c)| (q.index(), c.index())),
                ),
                InstructionKind::Reset => {
                    for q in &inst.qubits {
                        state.reset(q.index(), &mut rng);
                    }
                }
                InstructionKind::Barrier => {}
            }
        }

        let qubits: Vec<usize> = measures.iter().map(|(q, _)| *q).collect();
        let samples = state.sample_measured(&qubits, experiment.shots, &mut rng);
        let mut clbits = vec![false; circuit.num_clbits()];
        for shot in samples {
            clbits.fill(false);
            for (&(q, c), bit) in measures.iter().zip(shot) {
                clbits[c] = match experiment.noise {
                    Some(noise) => noise.apply_readout(q, bit, &mut rng),
                    None => bit,
                };
            }
            record(&clbits);
        }
    } else {
        for shot in 0..experiment.shots {
            let mut state = initial.clone();
            let mut clbits = vec![false; circuit.num_clbits()];
            for inst in circuit.instructions() {
                match &inst.kind {
                    InstructionKind::Gate(gate) => {
                        apply_gate(&mut state, gate, &inst.qubits, experiment.noise, &mut rng)?;
                    }
                    InstructionKind::Measure => {
                        for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                            let bit = state.measure(q.index(), &mut rng);
                            clbits[c.index()] = match experiment.noise {
                                Some(noise) => noise.apply_readout(q.index(), bit, &mut rng),
                                None => bit,
                            };
                        }
                    }
                    InstructionKind::Reset => {
                        for q in &inst.qubits {
                            state.reset(q.index(), &mut rng);
                        }
                    }
                    InstructionKind::Barrier => {}
                }
            }
            record(&clbits);

            if shot > 0 && shot % 1000 == 0 {
                debug!("Completed {} shots", shot);
            }
        }
    }

    Ok(Outcomes {
        counts,
        memory,
        measure_sampling,
    })
}

fn apply_gate<E: SimulationEngine>(
    state: &mut E,
    gate: &Gate,
    operands: &[qrt_ir::QubitId],
    noise: Option<&NoiseModel>,
    rng: &mut StdRng,
) -> HalResult<()> {
    let qubits: Vec<usize> = operands.iter().map(|q| q.index()).collect();
    state.apply_gate(&gate.kind, &qubits)?;
    if let Some(noise) = noise {
        let p = noise.gate_error(qubits.len());
        if p > 0.0 {
            state.apply_gate_noise(&qubits, p, rng);
        }
    }
    Ok(())
}

/// Classical register as a bitstring, clbit 0 rightmost.
fn bitstring(clbits: &[bool]) -> String {
    clbits
        .iter()
        .rev()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrt_ir::{ClbitId, QubitId, reference};

    fn experiment(circuit: &Circuit, method: SimulationMethod) -> Experiment<'_> {
        Experiment {
            circuit,
            method,
            noise: None,
            shots: 500,
            seed: 1234,
            memory: false,
        }
    }

    #[test]
    fn test_bitstring_order() {
        assert_eq!(bitstring(&[true, false, false]), "001");
        assert_eq!(bitstring(&[false, true]), "10");
    }

    #[test]
    fn test_bell_on_every_engine() {
        let bell = reference::bell().unwrap();
        for method in [
            SimulationMethod::Statevector,
            SimulationMethod::DensityMatrix,
            SimulationMethod::Stabilizer,
        ] {
            let result = run_experiment(&experiment(&bell, method)).unwrap();
            let counts = &result.counts;
            assert_eq!(counts.get("00") + counts.get("11"), 500, "{method}");
            assert!(counts.get("00") > 150 && counts.get("11") > 150, "{method}");
            assert!(result.metadata.measure_sampling);
            assert_eq!(result.metadata.method, method);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let ghz = reference::ghz(3).unwrap();
        let a = run_experiment(&experiment(&ghz, SimulationMethod::Statevector)).unwrap();
        let b = run_experiment(&experiment(&ghz, SimulationMethod::Statevector)).unwrap();
        assert_eq!(a.counts, b.counts);
    }

    #[test]
    fn test_mid_circuit_measurement_uses_trajectories() {
        // Measure q0, then copy it onto q1 with CX and measure again.
        let mut circuit = Circuit::with_size("mid", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        let result = run_experiment(&experiment(&circuit, SimulationMethod::Statevector)).unwrap();
        assert!(!result.metadata.measure_sampling);
        assert_eq!(result.counts.get("00") + result.counts.get("11"), 500);
    }

    #[test]
    fn test_memory_records_every_shot() {
        let bell = reference::bell().unwrap();
        let mut exp = experiment(&bell, SimulationMethod::Statevector);
        exp.memory = true;
        exp.shots = 20;
        let result = run_experiment(&exp).unwrap();
        let memory = result.memory.unwrap();
        assert_eq!(memory.len(), 20);
        assert!(memory.iter().all(|m| m == "00" || m == "11"));
    }

    #[test]
    fn test_readout_error_shows_up_in_counts() {
        let mut circuit = Circuit::with_size("zero", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        let noise = NoiseModel::new().with_readout_error(vec![0.2]);

        let mut exp = experiment(&circuit, SimulationMethod::Statevector);
        exp.noise = Some(&noise);
        exp.shots = 2000;
        let result = run_experiment(&exp).unwrap();
        let flipped = result.counts.get("1") as f64 / 2000.0;
        assert!((flipped - 0.2).abs() < 0.04, "flip rate {flipped}");
        assert!(result.metadata.noise);
    }

    #[test]
    fn test_gate_noise_forces_trajectories_except_density_matrix() {
        let bell = reference::bell().unwrap();
        let noise = NoiseModel::new().with_gate_error_2q(0.1);

        let mut exp = experiment(&bell, SimulationMethod::Statevector);
        exp.noise = Some(&noise);
        assert!(!run_experiment(&exp).unwrap().metadata.measure_sampling);

        exp.method = SimulationMethod::DensityMatrix;
        let result = run_experiment(&exp).unwrap();
        assert!(result.metadata.measure_sampling);
        // Depolarizing noise leaks weight into 01 and 10.
        assert!(result.counts.get("01") + result.counts.get("10") > 0);
    }

    #[test]
    fn test_expectation_values() {
        let bell = reference::bell().unwrap();
        let zz = SparsePauliOp::from_label("ZZ").unwrap();
        let mixed = SparsePauliOp::from_list([("XX", 0.5), ("ZI", 2.0)]).unwrap();
        for method in [
            SimulationMethod::Statevector,
            SimulationMethod::DensityMatrix,
            SimulationMethod::Stabilizer,
        ] {
            let values = expectation_values(&bell, method, &[zz.clone(), mixed.clone()]).unwrap();
            assert!((values[0] - 1.0).abs() < 1e-10);
            assert!((values[1] - 0.5).abs() < 1e-10);
        }
    }

    #[test]
    fn test_expectation_width_mismatch() {
        let bell = reference::bell().unwrap();
        let z = SparsePauliOp::from_label("Z").unwrap();
        let err = expectation_values(&bell, SimulationMethod::Statevector, &[z]).unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }
}
