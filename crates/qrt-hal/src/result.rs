//! Execution results.
//!
//! Bitstrings follow the usual convention: classical bit 0 is the
//! rightmost character, so outcome `"10"` means bit 1 read 1 and bit 0
//! read 0, which is integer outcome 2.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::job::JobId;
use crate::options::SimulationMethod;

/// Measurement counts: bitstring → number of shots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from `(bitstring, count)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut counts = Self::new();
        for (bits, n) in pairs {
            counts.insert(bits, n);
        }
        counts
    }

    /// Set the count for a bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        self.counts.insert(bitstring.into(), count);
    }

    /// Add `n` shots to a bitstring.
    pub fn increment(&mut self, bitstring: impl Into<String>, n: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += n;
    }

    /// Count for a bitstring, zero if never observed.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterate over `(bitstring, count)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Outcomes sorted by descending count, ties by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut v: Vec<_> = self.counts.iter().collect();
        v.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        v
    }

    /// The most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Counts keyed by the integer value of each bitstring.
    ///
    /// Bitstrings that are not valid binary (or wider than 64 bits) are
    /// skipped.
    pub fn int_outcomes(&self) -> FxHashMap<u64, u64> {
        let mut out = FxHashMap::default();
        for (bits, n) in &self.counts {
            if let Ok(value) = u64::from_str_radix(bits, 2) {
                *out.entry(value).or_insert(0) += n;
            }
        }
        out
    }

    /// Probabilities (count / total) keyed by bitstring.
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots();
        if total == 0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, v)| (k.clone(), *v as f64 / total as f64))
            .collect()
    }
}

/// Simulator-side metadata for one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// The method that actually ran (never `automatic`).
    pub method: SimulationMethod,
    /// Circuit width.
    pub num_qubits: usize,
    /// Number of classical bits.
    pub num_clbits: usize,
    /// True when all shots were sampled from a single final state.
    pub measure_sampling: bool,
    /// True when a noise model was active.
    pub noise: bool,
}

/// Result of one circuit within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Circuit name.
    pub name: String,
    /// Shots executed.
    pub shots: u32,
    /// Seed used for this experiment.
    pub seed_simulator: u64,
    /// Whether the experiment succeeded.
    pub success: bool,
    /// Measurement counts.
    pub counts: Counts,
    /// Per-shot bitstrings, when memory was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<String>>,
    /// Simulator metadata.
    pub metadata: ExperimentMetadata,
    /// Wall time in seconds.
    pub time_taken: f64,
}

/// Result of a whole job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Backend that ran the job.
    pub backend_name: String,
    /// The job identifier.
    pub job_id: JobId,
    /// True if every experiment succeeded.
    pub success: bool,
    /// Wall time in seconds for the whole batch.
    pub time_taken: f64,
    /// One entry per submitted circuit, in submission order.
    pub results: Vec<ExperimentResult>,
}

impl ExecutionResult {
    /// Counts of the experiment at `index`.
    pub fn counts(&self, index: usize) -> Option<&Counts> {
        self.results.get(index).map(|r| &r.counts)
    }
}

/// Exact expectation values of observables for one circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationResult {
    /// One value per observable, in order.
    pub values: Vec<f64>,
    /// Simulator metadata.
    pub metadata: ExperimentMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_basics() {
        let mut counts = Counts::from_pairs([("00", 48u64), ("11", 52u64)]);
        counts.increment("11", 1);

        assert_eq!(counts.get("11"), 53);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 101);
        assert_eq!(counts.most_frequent(), Some((&"11".to_string(), &53)));
    }

    #[test]
    fn test_int_outcomes_use_rightmost_bit_zero() {
        let counts = Counts::from_pairs([("10", 3u64), ("01", 1u64)]);
        let ints = counts.int_outcomes();
        assert_eq!(ints.get(&2), Some(&3));
        assert_eq!(ints.get(&1), Some(&1));
    }

    #[test]
    fn test_sorted_ties_by_bitstring() {
        let counts = Counts::from_pairs([("11", 5u64), ("00", 5u64), ("01", 1u64)]);
        let sorted: Vec<_> = counts.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(sorted, vec!["00", "11", "01"]);
    }

    #[test]
    fn test_probabilities() {
        let counts = Counts::from_pairs([("0", 1u64), ("1", 3u64)]);
        let p = counts.probabilities();
        assert!((p["1"] - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }
}
