//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;
use rand::rngs::StdRng;
use std::f64::consts::PI;

use qrt_hal::HalResult;
use qrt_ir::{GateKind, Pauli, PauliString, StandardGate};

use crate::engine::{PauliMasks, SimulationEngine, cumulative, sample_index};
use crate::unitary::{angle, apply_matrix, control_base, gate_matrix};

/// A statevector representing a pure quantum state.
#[derive(Debug, Clone)]
pub(crate) struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    #[cfg(test)]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Project `qubit` onto `outcome` and renormalize.
    fn collapse(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let scale = if probability > 0.0 {
            1.0 / probability.sqrt()
        } else {
            0.0
        };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
    }

    /// Apply a standard gate through a dedicated kernel, returning `false`
    /// when the generic matrix path has to take over.
    fn apply_standard_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> HalResult<bool> {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Z => self.apply_phase(qubits[0], PI),
            StandardGate::S => self.apply_phase(qubits[0], PI / 2.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], -PI / 2.0),
            StandardGate::T => self.apply_phase(qubits[0], PI / 4.0),
            StandardGate::Tdg => self.apply_phase(qubits[0], -PI / 4.0),
            StandardGate::P(theta) => self.apply_phase(qubits[0], angle(theta)?),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1], Complex64::new(1.0, 0.0)),
            StandardGate::ISwap => self.apply_swap(qubits[0], qubits[1], Complex64::new(0.0, 1.0)),
            StandardGate::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            g if g.num_qubits() == 1 => {
                let m = gate_matrix(&GateKind::Standard(g.clone()))?;
                self.apply_single(qubits[0], 0, &m);
            }
            g => match control_base(g) {
                Some(base) => {
                    let m = gate_matrix(&GateKind::Standard(base))?;
                    self.apply_single(qubits[1], 1 << qubits[0], &m);
                }
                None => return Ok(false),
            },
        }
        Ok(true)
    }

    // =========================================================================
    // Kernels
    // =========================================================================

    /// Apply a 2×2 unitary to `qubit` on every basis pair whose `controls`
    /// bits are all set.
    fn apply_single(&mut self, qubit: usize, controls: usize, m: &[Complex64]) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 && i & controls == controls {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0] * a + m[1] * b;
                self.amplitudes[j] = m[2] * a + m[3] * b;
            }
        }
    }

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// Exchange `|..1..0..⟩` and `|..0..1..⟩` on `q1`/`q2`, multiplying both
    /// by `phase` (1 for SWAP, i for iSWAP).
    fn apply_swap(&mut self, q1: usize, q2: usize, phase: Complex64) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..(1 << self.num_qubits) {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = phase * self.amplitudes[j];
                self.amplitudes[j] = phase * tmp;
            }
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let controls = (1 << c1) | (1 << c2);
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & controls == controls) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }
}

impl SimulationEngine for Statevector {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn apply_gate(&mut self, gate: &GateKind, qubits: &[usize]) -> HalResult<()> {
        if let GateKind::Standard(std_gate) = gate {
            if self.apply_standard_gate(std_gate, qubits)? {
                return Ok(());
            }
        }
        let matrix = gate_matrix(gate)?;
        apply_matrix(&mut self.amplitudes, qubits, &matrix);
        Ok(())
    }

    fn apply_pauli(&mut self, qubit: usize, pauli: Pauli) {
        match pauli {
            Pauli::I => {}
            Pauli::X => self.apply_x(qubit),
            Pauli::Y => {
                let i = Complex64::new(0.0, 1.0);
                let zero = Complex64::new(0.0, 0.0);
                self.apply_single(qubit, 0, &[zero, -i, i, zero]);
            }
            Pauli::Z => self.apply_phase(qubit, PI),
        }
    }

    fn measure(&mut self, qubit: usize, rng: &mut StdRng) -> bool {
        let p1 = self.probability_one(qubit);
        let outcome = rng.r#gen::<f64>() < p1;
        let probability = if outcome { p1 } else { 1.0 - p1 };
        self.collapse(qubit, outcome, probability);
        outcome
    }

    fn expectation(&self, pauli: &PauliString) -> f64 {
        let masks = PauliMasks::new(pauli);
        self.amplitudes
            .iter()
            .enumerate()
            .map(|(i, amp)| {
                let j = i ^ masks.x_mask;
                (self.amplitudes[j].conj() * masks.phase(i) * amp).re
            })
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn apply(sv: &mut Statevector, gate: StandardGate, qubits: &[usize]) {
        sv.apply_gate(&GateKind::Standard(gate), qubits).unwrap();
    }

    fn bell() -> Statevector {
        let mut sv = Statevector::new(2);
        apply(&mut sv, StandardGate::H, &[0]);
        apply(&mut sv, StandardGate::CX, &[0, 1]);
        sv
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn test_bell_state() {
        let sv = bell();
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_bell_expectations() {
        let sv = bell();
        let zz = PauliString::from_label("ZZ").unwrap();
        let xx = PauliString::from_label("XX").unwrap();
        let yy = PauliString::from_label("YY").unwrap();
        let zi = PauliString::from_label("IZ").unwrap();
        assert!((sv.expectation(&zz) - 1.0).abs() < 1e-10);
        assert!((sv.expectation(&xx) - 1.0).abs() < 1e-10);
        assert!((sv.expectation(&yy) + 1.0).abs() < 1e-10);
        assert!(sv.expectation(&zi).abs() < 1e-10);
    }

    #[test]
    fn test_controlled_gate_respects_operand_order() {
        // |q1 q0> = |10>: only q1 is set, so CY(0, 1) does nothing.
        let mut sv = Statevector::new(2);
        apply(&mut sv, StandardGate::X, &[1]);
        apply(&mut sv, StandardGate::CY, &[0, 1]);
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(1.0, 0.0)));

        apply(&mut sv, StandardGate::CY, &[1, 0]);
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn test_matrix_fallback_matches_kernels() {
        // RZZ has no dedicated kernel; compare with CX · RZ · CX.
        let theta = 0.8;
        let mut a = Statevector::new(2);
        apply(&mut a, StandardGate::H, &[0]);
        apply(&mut a, StandardGate::H, &[1]);
        apply(&mut a, StandardGate::RZZ(theta.into()), &[0, 1]);

        let mut b = Statevector::new(2);
        apply(&mut b, StandardGate::H, &[0]);
        apply(&mut b, StandardGate::H, &[1]);
        apply(&mut b, StandardGate::CX, &[0, 1]);
        apply(&mut b, StandardGate::Rz(theta.into()), &[1]);
        apply(&mut b, StandardGate::CX, &[0, 1]);

        for (x, y) in a.amplitudes().iter().zip(b.amplitudes()) {
            assert!(approx_eq(*x, *y));
        }
    }

    #[test]
    fn test_iswap_phase() {
        let mut sv = Statevector::new(2);
        apply(&mut sv, StandardGate::X, &[0]);
        apply(&mut sv, StandardGate::ISwap, &[0, 1]);
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sv = bell();

        let first = sv.measure(0, &mut rng);
        // The partner qubit is now fully determined.
        for _ in 0..10 {
            assert_eq!(sv.clone().measure(1, &mut rng), first);
        }
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(1);
        apply(&mut sv, StandardGate::H, &[0]);
        sv.reset(0, &mut rng);
        assert!((sv.amplitudes[0].norm() - 1.0).abs() < 1e-10);
        assert!(sv.amplitudes[1].norm() < 1e-10);
    }

    #[test]
    fn test_sample_deterministic() {
        // |1⟩ state should always sample to 1
        let mut rng = StdRng::seed_from_u64(0);
        let mut sv = Statevector::new(1);
        apply(&mut sv, StandardGate::X, &[0]);

        let samples = sv.sample_measured(&[0], 100, &mut rng);
        assert!(samples.iter().all(|s| s == &vec![true]));
    }
}
