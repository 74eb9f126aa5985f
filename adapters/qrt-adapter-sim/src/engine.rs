//! The interface every simulation engine implements.

use rand::Rng;
use rand::rngs::StdRng;

use qrt_hal::HalResult;
use qrt_ir::{GateKind, Pauli, PauliString};

use crate::noise;

/// A quantum state that can be evolved gate by gate and measured.
///
/// Engines are cloned once per trajectory, so `Clone` should be a plain
/// copy of the state.
pub(crate) trait SimulationEngine: Clone + Send {
    /// True when gate noise and reset are applied as exact channels, so a
    /// single evolution already describes every shot.
    const EXACT_NOISE: bool = false;

    /// Number of qubits held by the state.
    fn num_qubits(&self) -> usize;

    /// Apply a unitary gate to `qubits` (operand order as in the circuit).
    fn apply_gate(&mut self, gate: &GateKind, qubits: &[usize]) -> HalResult<()>;

    /// Apply a single-qubit Pauli.
    fn apply_pauli(&mut self, qubit: usize, pauli: Pauli);

    /// Measure `qubit` in the computational basis and collapse the state.
    fn measure(&mut self, qubit: usize, rng: &mut StdRng) -> bool;

    /// Return `qubit` to `|0⟩`.
    fn reset(&mut self, qubit: usize, rng: &mut StdRng) {
        if self.measure(qubit, rng) {
            self.apply_pauli(qubit, Pauli::X);
        }
    }

    /// Expectation value of a Pauli string (coefficient 1).
    fn expectation(&self, pauli: &PauliString) -> f64;

    /// Draw `shots` joint outcomes of `qubits` without disturbing the state.
    ///
    /// The default clones the state for every shot; dense engines override
    /// this with cumulative-probability sampling.
    fn sample_measured(&self, qubits: &[usize], shots: u32, rng: &mut StdRng) -> Vec<Vec<bool>> {
        (0..shots)
            .map(|_| {
                let mut state = self.clone();
                qubits.iter().map(|&q| state.measure(q, rng)).collect()
            })
            .collect()
    }

    /// Depolarizing error with probability `p` after a gate on `qubits`.
    ///
    /// Trajectory engines apply a uniformly random non-identity Pauli.
    fn apply_gate_noise(&mut self, qubits: &[usize], p: f64, rng: &mut StdRng) {
        if let Some(paulis) = noise::sample_depolarizing(qubits.len(), p, rng) {
            for (&q, pauli) in qubits.iter().zip(paulis) {
                self.apply_pauli(q, pauli);
            }
        }
    }
}

/// Dense bit masks of a Pauli string.
///
/// `P|i⟩ = i^y_count · (-1)^popcount(i & z_mask) · |i ^ x_mask⟩`, where
/// `z_mask` covers both Z and Y positions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PauliMasks {
    pub x_mask: usize,
    pub z_mask: usize,
    pub y_count: u32,
}

impl PauliMasks {
    pub fn new(pauli: &PauliString) -> Self {
        let mut masks = Self {
            x_mask: 0,
            z_mask: 0,
            y_count: 0,
        };
        for (q, op) in pauli.support() {
            let (x, z) = op.xz();
            if x {
                masks.x_mask |= 1 << q;
            }
            if z {
                masks.z_mask |= 1 << q;
            }
            if x && z {
                masks.y_count += 1;
            }
        }
        masks
    }

    /// The phase picked up by basis state `i`.
    #[inline]
    pub fn phase(&self, i: usize) -> num_complex::Complex64 {
        let sign = if (i & self.z_mask).count_ones() % 2 == 1 {
            -1.0
        } else {
            1.0
        };
        let base = match self.y_count % 4 {
            0 => num_complex::Complex64::new(1.0, 0.0),
            1 => num_complex::Complex64::new(0.0, 1.0),
            2 => num_complex::Complex64::new(-1.0, 0.0),
            _ => num_complex::Complex64::new(0.0, -1.0),
        };
        base * sign
    }
}

/// Index of the first cumulative weight exceeding a uniform draw.
pub(crate) fn sample_index(cumulative: &[f64], rng: &mut StdRng) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let r: f64 = rng.r#gen::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}

/// Running sums of `probabilities`.
pub(crate) fn cumulative(probabilities: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut acc = 0.0;
    probabilities
        .into_iter()
        .map(|p| {
            acc += p;
            acc
        })
        .collect()
}
