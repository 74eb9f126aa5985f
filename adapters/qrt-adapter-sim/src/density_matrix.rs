//! Density-matrix simulation engine.
//!
//! `ρ` is stored as a vector over `2n` qubits: entry `ρ[r, c]` lives at
//! index `r + (c << n)`. A unitary `U` on qubits `q` then acts as `U` on
//! the row qubits `q` and `conj(U)` on the column qubits `q + n`, which
//! lets the statevector matrix kernel do all the work.

use num_complex::Complex64;
use rand::Rng;
use rand::rngs::StdRng;

use qrt_hal::HalResult;
use qrt_ir::{GateKind, Pauli, PauliString, StandardGate};

use crate::engine::{PauliMasks, SimulationEngine, cumulative, sample_index};
use crate::unitary::{apply_matrix, conjugate, gate_matrix};

/// A mixed state on `num_qubits` qubits.
#[derive(Debug, Clone)]
pub(crate) struct DensityMatrix {
    data: Vec<Complex64>,
    num_qubits: usize,
}

impl DensityMatrix {
    /// `|0…0⟩⟨0…0|`.
    pub fn new(num_qubits: usize) -> Self {
        let mut data = vec![Complex64::new(0.0, 0.0); 1 << (2 * num_qubits)];
        data[0] = Complex64::new(1.0, 0.0);
        Self { data, num_qubits }
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row | (col << self.num_qubits)
    }

    /// Diagonal of `ρ`.
    pub fn probabilities(&self) -> Vec<f64> {
        (0..1usize << self.num_qubits)
            .map(|i| self.data[self.index(i, i)].re.max(0.0))
            .collect()
    }

    pub fn trace(&self) -> f64 {
        self.probabilities().iter().sum()
    }

    fn apply_unitary(&mut self, qubits: &[usize], matrix: &[Complex64]) {
        let n = self.num_qubits;
        let cols: Vec<usize> = qubits.iter().map(|q| q + n).collect();
        apply_matrix(&mut self.data, qubits, matrix);
        apply_matrix(&mut self.data, &cols, &conjugate(matrix));
    }

    /// Replace `qubit` by the maximally mixed state: `Tr_q(ρ) ⊗ I/2`.
    fn fully_depolarize(&mut self, qubit: usize) {
        let n = self.num_qubits;
        let row_mask = 1 << qubit;
        let col_mask = 1 << (qubit + n);
        for idx in 0..self.data.len() {
            if idx & (row_mask | col_mask) != 0 {
                continue;
            }
            let both = idx | row_mask | col_mask;
            let avg = (self.data[idx] + self.data[both]) * 0.5;
            self.data[idx] = avg;
            self.data[both] = avg;
            self.data[idx | row_mask] = Complex64::new(0.0, 0.0);
            self.data[idx | col_mask] = Complex64::new(0.0, 0.0);
        }
    }

    /// Keep only the block where `qubit` reads `outcome` on both sides.
    fn project(&mut self, qubit: usize, outcome: bool) -> f64 {
        let n = self.num_qubits;
        let row_mask = 1 << qubit;
        let col_mask = 1 << (qubit + n);
        let want = if outcome { row_mask | col_mask } else { 0 };
        for (idx, value) in self.data.iter_mut().enumerate() {
            if idx & (row_mask | col_mask) != want {
                *value = Complex64::new(0.0, 0.0);
            }
        }
        self.trace()
    }

    fn scale(&mut self, factor: f64) {
        for value in &mut self.data {
            *value *= factor;
        }
    }
}

impl SimulationEngine for DensityMatrix {
    const EXACT_NOISE: bool = true;

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn apply_gate(&mut self, gate: &GateKind, qubits: &[usize]) -> HalResult<()> {
        let matrix = gate_matrix(gate)?;
        self.apply_unitary(qubits, &matrix);
        Ok(())
    }

    fn apply_pauli(&mut self, qubit: usize, pauli: Pauli) {
        let gate = match pauli {
            Pauli::I => return,
            Pauli::X => StandardGate::X,
            Pauli::Y => StandardGate::Y,
            Pauli::Z => StandardGate::Z,
        };
        if let Ok(matrix) = gate_matrix(&GateKind::Standard(gate)) {
            self.apply_unitary(&[qubit], &matrix);
        }
    }

    fn measure(&mut self, qubit: usize, rng: &mut StdRng) -> bool {
        let mask = 1 << qubit;
        let p1: f64 = self
            .probabilities()
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, p)| p)
            .sum();
        let outcome = rng.r#gen::<f64>() < p1;
        let kept = self.project(qubit, outcome);
        if kept > 0.0 {
            self.scale(1.0 / kept);
        }
        outcome
    }

    /// Reset is the deterministic channel `|0⟩⟨0|ρ|0⟩⟨0| + |0⟩⟨1|ρ|1⟩⟨0|`.
    fn reset(&mut self, qubit: usize, _rng: &mut StdRng) {
        let n = self.num_qubits;
        let row_mask = 1 << qubit;
        let col_mask = 1 << (qubit + n);
        for idx in 0..self.data.len() {
            if idx & (row_mask | col_mask) != 0 {
                continue;
            }
            let both = idx | row_mask | col_mask;
            let moved = self.data[both];
            self.data[idx] += moved;
            self.data[both] = Complex64::new(0.0, 0.0);
            self.data[idx | row_mask] = Complex64::new(0.0, 0.0);
            self.data[idx | col_mask] = Complex64::new(0.0, 0.0);
        }
    }

    fn expectation(&self, pauli: &PauliString) -> f64 {
        // Tr(ρP) = Σ_r ρ[r, r ^ x] · phase(r)
        let masks = PauliMasks::new(pauli);
        (0..1usize << self.num_qubits)
            .map(|r| (self.data[self.index(r, r ^ masks.x_mask)] * masks.phase(r)).re)
            .sum()
    }

    fn sample_measured(&self, qubits: &[usize], shots: u32, rng: &mut StdRng) -> Vec<Vec<bool>> {
        let cumulative = cumulative(self.probabilities());
        (0..shots)
            .map(|_| {
                let outcome = sample_index(&cumulative, rng);
                qubits.iter().map(|&q| outcome & (1 << q) != 0).collect()
            })
            .collect()
    }

    /// The exact depolarizing channel.
    ///
    /// With `d = 4^k` for `k` qubits, applying a uniformly random
    /// non-identity Pauli with probability `p` equals
    /// `(1 - p·d/(d-1))·ρ + p·d/(d-1)·D(ρ)`, where `D` fully depolarizes
    /// every qubit in `qubits`.
    fn apply_gate_noise(&mut self, qubits: &[usize], p: f64, _rng: &mut StdRng) {
        if p <= 0.0 || qubits.is_empty() {
            return;
        }
        let d = 4f64.powi(qubits.len() as i32);
        let mixed_weight = p * d / (d - 1.0);

        let mut mixed = self.clone();
        for &q in qubits {
            mixed.fully_depolarize(q);
        }
        for (value, m) in self.data.iter_mut().zip(&mixed.data) {
            *value = *value * (1.0 - mixed_weight) + m * mixed_weight;
        }
    }
}
