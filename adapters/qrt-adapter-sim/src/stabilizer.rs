//! Clifford simulation on an Aaronson–Gottesman tableau.
//!
//! The tableau has `2n` rows of `2n + 1` bits: rows `0..n` are the
//! destabilizers, rows `n..2n` the stabilizers. Each row stores the X bits,
//! then the Z bits, then the sign bit `r` (`r = 1` means a `-1` phase).
//! A Y on a qubit is encoded as `x = z = 1` with no extra phase.

use rand::Rng;
use rand::rngs::StdRng;

use qrt_hal::{HalError, HalResult};
use qrt_ir::{GateKind, Pauli, PauliString, StandardGate};

use crate::engine::SimulationEngine;

/// Stabilizer state of `num_qubits` qubits.
#[derive(Debug, Clone)]
pub(crate) struct StabilizerState {
    num_qubits: usize,
    tableau: Vec<bool>,
}

impl StabilizerState {
    /// `|0…0⟩`: destabilizer `i` is `X_i`, stabilizer `i` is `Z_i`.
    pub fn new(num_qubits: usize) -> Self {
        let n = num_qubits;
        let stride = 2 * n + 1;
        let mut tableau = vec![false; 2 * n * stride];
        for i in 0..n {
            tableau[i * stride + i] = true;
            tableau[(n + i) * stride + n + i] = true;
        }
        Self {
            num_qubits,
            tableau,
        }
    }

    #[inline]
    fn stride(&self) -> usize {
        2 * self.num_qubits + 1
    }

    #[inline]
    fn x(&self, row: usize, col: usize) -> bool {
        self.tableau[row * self.stride() + col]
    }

    #[inline]
    fn z(&self, row: usize, col: usize) -> bool {
        self.tableau[row * self.stride() + self.num_qubits + col]
    }

    #[inline]
    fn r(&self, row: usize) -> bool {
        self.tableau[row * self.stride() + 2 * self.num_qubits]
    }

    #[inline]
    fn set_x(&mut self, row: usize, col: usize, val: bool) {
        let idx = row * self.stride() + col;
        self.tableau[idx] = val;
    }

    #[inline]
    fn set_z(&mut self, row: usize, col: usize, val: bool) {
        let idx = row * self.stride() + self.num_qubits + col;
        self.tableau[idx] = val;
    }

    #[inline]
    fn flip_r(&mut self, row: usize) {
        let idx = row * self.stride() + 2 * self.num_qubits;
        self.tableau[idx] = !self.tableau[idx];
    }

    fn row(&self, row: usize) -> &[bool] {
        let stride = self.stride();
        &self.tableau[row * stride..(row + 1) * stride]
    }

    /// Left-multiply row `target` by row `source`.
    fn row_mult(&mut self, target: usize, source: usize) {
        let stride = self.stride();
        let (src, dst) = if source < target {
            let (lo, hi) = self.tableau.split_at_mut(target * stride);
            (&lo[source * stride..(source + 1) * stride], &mut hi[..stride])
        } else {
            let (lo, hi) = self.tableau.split_at_mut(source * stride);
            (&hi[..stride] as &[bool], &mut lo[target * stride..(target + 1) * stride])
        };
        multiply_into(dst, src, self.num_qubits);
    }

    // -----------------------------------------------------------------------
    // Clifford generators
    // -----------------------------------------------------------------------

    /// H: X ↔ Z, Y → -Y.
    fn hadamard(&mut self, q: usize) {
        for i in 0..2 * self.num_qubits {
            let (xi, zi) = (self.x(i, q), self.z(i, q));
            if xi && zi {
                self.flip_r(i);
            }
            self.set_x(i, q, zi);
            self.set_z(i, q, xi);
        }
    }

    /// S: X → Y, Y → -X.
    fn phase(&mut self, q: usize) {
        for i in 0..2 * self.num_qubits {
            let (xi, zi) = (self.x(i, q), self.z(i, q));
            if xi && zi {
                self.flip_r(i);
            }
            self.set_z(i, q, zi ^ xi);
        }
    }

    fn cnot(&mut self, control: usize, target: usize) {
        for i in 0..2 * self.num_qubits {
            let xc = self.x(i, control);
            let zt = self.z(i, target);
            let xt = self.x(i, target);
            let zc = self.z(i, control);
            if xc && zt && (xt == zc) {
                self.flip_r(i);
            }
            self.set_x(i, target, xt ^ xc);
            self.set_z(i, control, zc ^ zt);
        }
    }

    /// Conjugation by a Pauli flips the sign of every anticommuting row.
    fn pauli(&mut self, q: usize, pauli: Pauli) {
        let (px, pz) = pauli.xz();
        for i in 0..2 * self.num_qubits {
            if (self.x(i, q) && pz) ^ (self.z(i, q) && px) {
                self.flip_r(i);
            }
        }
    }

    fn phase_dagger(&mut self, q: usize) {
        self.phase(q);
        self.pauli(q, Pauli::Z);
    }

    fn apply_standard(&mut self, gate: &StandardGate, qubits: &[usize]) -> HalResult<()> {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.pauli(qubits[0], Pauli::X),
            StandardGate::Y => self.pauli(qubits[0], Pauli::Y),
            StandardGate::Z => self.pauli(qubits[0], Pauli::Z),
            StandardGate::H => self.hadamard(qubits[0]),
            StandardGate::S => self.phase(qubits[0]),
            StandardGate::Sdg => self.phase_dagger(qubits[0]),
            // √X = H·S·H
            StandardGate::SX => {
                self.hadamard(qubits[0]);
                self.phase(qubits[0]);
                self.hadamard(qubits[0]);
            }
            StandardGate::SXdg => {
                self.hadamard(qubits[0]);
                self.phase_dagger(qubits[0]);
                self.hadamard(qubits[0]);
            }
            StandardGate::CX => self.cnot(qubits[0], qubits[1]),
            // CY = S_t · CX · S†_t
            StandardGate::CY => {
                self.phase_dagger(qubits[1]);
                self.cnot(qubits[0], qubits[1]);
                self.phase(qubits[1]);
            }
            StandardGate::CZ => {
                self.hadamard(qubits[1]);
                self.cnot(qubits[0], qubits[1]);
                self.hadamard(qubits[1]);
            }
            StandardGate::Swap => {
                self.cnot(qubits[0], qubits[1]);
                self.cnot(qubits[1], qubits[0]);
                self.cnot(qubits[0], qubits[1]);
            }
            other => {
                return Err(HalError::InvalidCircuit(format!(
                    "gate '{}' is not a Clifford gate; the stabilizer method cannot run it",
                    other.name()
                )));
            }
        }
        Ok(())
    }

    /// Sign of the stabilizer-group element equal to `±target`, found by
    /// multiplying together the stabilizers whose destabilizer partners
    /// anticommute with `target`.
    fn stabilizer_sign(&self, anticommutes: impl Fn(&[bool]) -> bool) -> bool {
        let n = self.num_qubits;
        let mut scratch = vec![false; self.stride()];
        for i in 0..n {
            if anticommutes(self.row(i)) {
                multiply_into(&mut scratch, self.row(n + i), n);
            }
        }
        scratch[2 * n]
    }
}

impl SimulationEngine for StabilizerState {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn apply_gate(&mut self, gate: &GateKind, qubits: &[usize]) -> HalResult<()> {
        match gate {
            GateKind::Standard(g) => self.apply_standard(g, qubits),
            GateKind::Custom(c) => Err(HalError::InvalidCircuit(format!(
                "custom gate '{}' cannot run on the stabilizer method",
                c.name
            ))),
        }
    }

    fn apply_pauli(&mut self, qubit: usize, pauli: Pauli) {
        self.pauli(qubit, pauli);
    }

    fn measure(&mut self, qubit: usize, rng: &mut StdRng) -> bool {
        let n = self.num_qubits;

        if let Some(p) = (n..2 * n).find(|&i| self.x(i, qubit)) {
            // Random outcome.
            for i in 0..2 * n {
                if i != p && self.x(i, qubit) {
                    self.row_mult(i, p);
                }
            }
            let stride = self.stride();
            let dest = p - n;
            self.tableau
                .copy_within(p * stride..(p + 1) * stride, dest * stride);
            self.tableau[p * stride..(p + 1) * stride].fill(false);
            self.set_z(p, qubit, true);

            let result: bool = rng.r#gen();
            if result {
                self.flip_r(p);
            }
            result
        } else {
            // Deterministic outcome: Z_qubit is (up to sign) in the group.
            self.stabilizer_sign(|row| row[qubit])
        }
    }

    fn expectation(&self, pauli: &PauliString) -> f64 {
        let n = self.num_qubits;
        let bits: Vec<(bool, bool)> = (0..n).map(|q| pauli.get(q).xz()).collect();
        let anticommutes = |row: &[bool]| {
            bits.iter()
                .enumerate()
                .filter(|(j, (px, pz))| (row[*j] && *pz) ^ (row[n + *j] && *px))
                .count()
                % 2
                == 1
        };

        if (n..2 * n).any(|i| anticommutes(self.row(i))) {
            return 0.0;
        }
        if self.stabilizer_sign(anticommutes) {
            -1.0
        } else {
            1.0
        }
    }
}

/// `dst ← src · dst` on a single tableau row, with phase tracking.
fn multiply_into(dst: &mut [bool], src: &[bool], n: usize) {
    let mut phase: i32 = 2 * i32::from(dst[2 * n]) + 2 * i32::from(src[2 * n]);
    for j in 0..n {
        phase += g(src[j], src[n + j], dst[j], dst[n + j]);
    }
    dst[2 * n] = phase.rem_euclid(4) == 2;
    for j in 0..2 * n {
        dst[j] ^= src[j];
    }
}

/// Power of `i` picked up when multiplying the single-qubit Paulis
/// `(x1, z1) · (x2, z2)`.
#[inline]
fn g(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    match (x1, z1) {
        (false, false) => 0,
        (true, true) => i32::from(z2) - i32::from(x2),
        (true, false) => i32::from(z2) * (2 * i32::from(x2) - 1),
        (false, true) => i32::from(x2) * (1 - 2 * i32::from(z2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::statevector::Statevector;

    fn apply<E: SimulationEngine>(state: &mut E, gate: StandardGate, qubits: &[usize]) {
        state
            .apply_gate(&GateKind::Standard(gate), qubits)
            .unwrap();
    }

    #[test]
    fn test_g_function() {
        // X·Y = iZ, Y·X = -iZ, Z·X = iY
        assert_eq!(g(true, false, true, true), 1);
        assert_eq!(g(true, true, true, false), -1);
        assert_eq!(g(false, true, true, false), 1);
        assert_eq!(g(true, false, false, true), -1);
        assert_eq!(g(true, true, false, true), 1);
        assert_eq!(g(false, true, true, true), -1);
        assert_eq!(g(true, true, true, true), 0);
    }

    #[test]
    fn test_initial_state_measures_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = StabilizerState::new(3);
        for q in 0..3 {
            assert!(!state.measure(q, &mut rng));
        }
    }

    #[test]
    fn test_x_flips() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = StabilizerState::new(2);
        apply(&mut state, StandardGate::X, &[1]);
        assert!(!state.measure(0, &mut rng));
        assert!(state.measure(1, &mut rng));
    }

    #[test]
    fn test_bell_correlations() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 2];
        for _ in 0..32 {
            let mut state = StabilizerState::new(2);
            apply(&mut state, StandardGate::H, &[0]);
            apply(&mut state, StandardGate::CX, &[0, 1]);
            let a = state.measure(0, &mut rng);
            let b = state.measure(1, &mut rng);
            assert_eq!(a, b);
            seen[usize::from(a)] = true;
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_non_clifford_rejected() {
        let mut state = StabilizerState::new(1);
        let err = state
            .apply_gate(&GateKind::Standard(StandardGate::T), &[0])
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidCircuit(_)));
    }

    #[test]
    fn test_expectations_match_statevector() {
        let circuit: Vec<(StandardGate, Vec<usize>)> = vec![
            (StandardGate::H, vec![0]),
            (StandardGate::S, vec![0]),
            (StandardGate::CX, vec![0, 1]),
            (StandardGate::SX, vec![2]),
            (StandardGate::CY, vec![1, 2]),
            (StandardGate::Sdg, vec![1]),
            (StandardGate::CZ, vec![2, 0]),
            (StandardGate::Swap, vec![0, 2]),
            (StandardGate::Y, vec![1]),
            (StandardGate::SXdg, vec![0]),
        ];

        let mut tableau = StabilizerState::new(3);
        let mut dense = Statevector::new(3);
        for (gate, qubits) in &circuit {
            apply(&mut tableau, gate.clone(), qubits);
            apply(&mut dense, gate.clone(), qubits);
        }

        let labels = ["ZZZ", "XYZ", "IXX", "YIY", "ZIX", "XXX", "IIZ", "YYI"];
        for label in labels {
            let p = PauliString::from_label(label).unwrap();
            let expected = dense.expectation(&p);
            let got = tableau.expectation(&p);
            assert!(
                (expected - got).abs() < 1e-9,
                "<{label}>: statevector {expected}, stabilizer {got}"
            );
        }
    }

    #[test]
    fn test_ghz_measurements_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..16 {
            let mut state = StabilizerState::new(4);
            apply(&mut state, StandardGate::H, &[0]);
            for q in 1..4 {
                apply(&mut state, StandardGate::CX, &[q - 1, q]);
            }
            let first = state.measure(0, &mut rng);
            for q in 1..4 {
                assert_eq!(state.measure(q, &mut rng), first);
            }
        }
    }
}
