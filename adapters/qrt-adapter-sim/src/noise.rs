//! Noise model for the local simulator.
//!
//! Two channels are supported, the ones device calibration data usually
//! reports:
//!
//! - **Depolarizing gate error**: after every one- or two-qubit gate, a
//!   uniformly random non-identity Pauli on the gate's qubits is applied
//!   with probability `p` (`gate_error_1q` / `gate_error_2q`). Gates on
//!   three or more qubits are noiseless.
//! - **Readout error**: each measured bit is flipped with the qubit's
//!   symmetric misclassification probability.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use qrt_hal::{HalError, HalResult};
use qrt_ir::Pauli;

/// Device-level noise parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Readout error per qubit; qubits past the end are read perfectly.
    #[serde(default)]
    pub readout_error: Vec<f64>,
    /// Depolarizing probability after single-qubit gates.
    #[serde(default)]
    pub gate_error_1q: f64,
    /// Depolarizing probability after two-qubit gates.
    #[serde(default)]
    pub gate_error_2q: f64,
}

impl NoiseModel {
    /// A noiseless model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-qubit readout errors.
    pub fn with_readout_error(mut self, errors: Vec<f64>) -> Self {
        self.readout_error = errors;
        self
    }

    /// Same readout error on the first `num_qubits` qubits.
    pub fn with_uniform_readout_error(mut self, num_qubits: usize, p: f64) -> Self {
        self.readout_error = vec![p; num_qubits];
        self
    }

    /// Set the single-qubit gate error.
    pub fn with_gate_error_1q(mut self, p: f64) -> Self {
        self.gate_error_1q = p;
        self
    }

    /// Set the two-qubit gate error.
    pub fn with_gate_error_2q(mut self, p: f64) -> Self {
        self.gate_error_2q = p;
        self
    }

    /// Check every probability lies in `[0, 1]`.
    pub fn validate(&self) -> HalResult<()> {
        let check = |name: &str, p: f64| {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(HalError::Configuration(format!(
                    "{name} must be a probability in [0, 1], got {p}"
                )))
            }
        };
        check("gate_error_1q", self.gate_error_1q)?;
        check("gate_error_2q", self.gate_error_2q)?;
        for (q, &p) in self.readout_error.iter().enumerate() {
            check(&format!("readout_error[{q}]"), p)?;
        }
        Ok(())
    }

    /// Readout error of `qubit`.
    pub fn readout_error(&self, qubit: usize) -> f64 {
        self.readout_error.get(qubit).copied().unwrap_or(0.0)
    }

    /// Depolarizing probability for a gate on `num_qubits` qubits.
    pub fn gate_error(&self, num_qubits: usize) -> f64 {
        match num_qubits {
            1 => self.gate_error_1q,
            2 => self.gate_error_2q,
            _ => 0.0,
        }
    }

    /// True if any gate error is non-zero.
    pub fn has_gate_errors(&self) -> bool {
        self.gate_error_1q > 0.0 || self.gate_error_2q > 0.0
    }

    /// True if the model changes nothing.
    pub fn is_ideal(&self) -> bool {
        !self.has_gate_errors() && self.readout_error.iter().all(|&p| p == 0.0)
    }

    /// Pass a measured bit through the readout channel of `qubit`.
    pub(crate) fn apply_readout(&self, qubit: usize, bit: bool, rng: &mut StdRng) -> bool {
        let p = self.readout_error(qubit);
        if p > 0.0 && rng.r#gen::<f64>() < p {
            !bit
        } else {
            bit
        }
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mean_readout = if self.readout_error.is_empty() {
            0.0
        } else {
            self.readout_error.iter().sum::<f64>() / self.readout_error.len() as f64
        };
        write!(
            f,
            "depolarizing(1q={:.4}, 2q={:.4}), readout_error(mean={:.4})",
            self.gate_error_1q, self.gate_error_2q, mean_readout
        )
    }
}

/// Draw the Pauli error of one depolarizing event on `num_qubits` qubits.
///
/// Returns `None` (no error) with probability `1 - p`, otherwise one of the
/// `4^k - 1` non-identity Paulis uniformly.
pub(crate) fn sample_depolarizing(num_qubits: usize, p: f64, rng: &mut StdRng) -> Option<Vec<Pauli>> {
    if num_qubits == 0 || p <= 0.0 || rng.r#gen::<f64>() >= p {
        return None;
    }
    const PAULIS: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];
    let total = 1usize << (2 * num_qubits);
    let pick = rng.gen_range(1..total);
    Some(
        (0..num_qubits)
            .map(|q| PAULIS[(pick >> (2 * q)) & 3])
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_noise_model_defaults() {
        let noise = NoiseModel::new();
        assert!(noise.is_ideal());
        assert!(!noise.has_gate_errors());
        assert_eq!(noise.readout_error(3), 0.0);
        assert_eq!(noise.gate_error(3), 0.0);
    }

    #[test]
    fn test_noise_model_builders() {
        let noise = NoiseModel::new()
            .with_uniform_readout_error(2, 0.02)
            .with_gate_error_1q(0.001)
            .with_gate_error_2q(0.01);
        assert!(!noise.is_ideal());
        assert_eq!(noise.readout_error(1), 0.02);
        assert_eq!(noise.readout_error(2), 0.0);
        assert_eq!(noise.gate_error(2), 0.01);
        assert!(noise.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let noise = NoiseModel::new().with_gate_error_2q(1.5);
        assert!(matches!(noise.validate(), Err(HalError::Configuration(_))));
        let noise = NoiseModel::new().with_readout_error(vec![0.1, -0.1]);
        assert!(noise.validate().is_err());
    }

    #[test]
    fn test_sample_depolarizing_never_identity() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let paulis = sample_depolarizing(2, 1.0, &mut rng).unwrap();
            assert_eq!(paulis.len(), 2);
            assert!(paulis.iter().any(|p| *p != Pauli::I));
        }
        assert!(sample_depolarizing(2, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_readout_flip_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        let noise = NoiseModel::new().with_readout_error(vec![0.25]);
        let flips = (0..4000)
            .filter(|_| noise.apply_readout(0, false, &mut rng))
            .count();
        let rate = flips as f64 / 4000.0;
        assert!((rate - 0.25).abs() < 0.03, "flip rate {rate}");
    }
}
