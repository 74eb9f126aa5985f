//! Primitive results.

use std::ops::Index;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qrt_hal::{Counts, ExperimentMetadata};

static ZERO: f64 = 0.0;

/// Widest classical register a [`QuasiDistribution`] outcome can key.
pub const MAX_OUTCOME_BITS: usize = u64::BITS as usize;

/// Outcome probabilities estimated from shots, keyed by integer outcome
/// (classical bit 0 is the least significant bit).
///
/// Indexing an outcome that never occurred yields `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuasiDistribution {
    probabilities: FxHashMap<u64, f64>,
}

impl QuasiDistribution {
    /// Normalise counts into a distribution.
    pub fn from_counts(counts: &Counts) -> Self {
        let total = counts.total_shots();
        if total == 0 {
            return Self::default();
        }
        let probabilities = counts
            .int_outcomes()
            .into_iter()
            .map(|(outcome, n)| (outcome, n as f64 / total as f64))
            .collect();
        Self { probabilities }
    }

    /// Probability of `outcome`, if it was observed.
    pub fn get(&self, outcome: u64) -> Option<f64> {
        self.probabilities.get(&outcome).copied()
    }

    /// Number of distinct observed outcomes.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Check if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Iterate over `(outcome, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &f64)> {
        self.probabilities.iter()
    }

    /// Keys rendered as zero-padded bitstrings of `num_bits` characters.
    pub fn binary_probabilities(&self, num_bits: usize) -> FxHashMap<String, f64> {
        self.probabilities
            .iter()
            .map(|(outcome, p)| (format!("{outcome:0num_bits$b}"), *p))
            .collect()
    }
}

impl Index<u64> for QuasiDistribution {
    type Output = f64;

    fn index(&self, outcome: u64) -> &f64 {
        self.probabilities.get(&outcome).unwrap_or(&ZERO)
    }
}

/// Per-circuit metadata of a sampler run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerMetadata {
    /// Shots taken.
    pub shots: u32,
    /// Seed the simulator used.
    pub seed_simulator: u64,
    /// Simulator-side metadata (method, sampling mode, noise).
    pub simulator_metadata: ExperimentMetadata,
}

/// Result of a sampler job: one distribution per circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerResult {
    /// Quasi-probability distributions, in circuit order.
    pub quasi_dists: Vec<QuasiDistribution>,
    /// Metadata, in circuit order.
    pub metadata: Vec<SamplerMetadata>,
}

/// Per-circuit metadata of an estimator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorMetadata {
    /// Shots the estimate stands for.
    pub shots: u32,
    /// Variance of the observable in the prepared state.
    pub variance: f64,
    /// Simulator-side metadata, when the backend reported any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulator_metadata: Option<ExperimentMetadata>,
}

/// Result of an estimator job: one value per (circuit, observable) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorResult {
    /// Expectation values.
    pub values: Vec<f64>,
    /// Metadata, in the same order.
    pub metadata: Vec<EstimatorMetadata>,
}
