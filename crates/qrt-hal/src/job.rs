//! Job identifiers, statuses and the records backends keep per job.
//!
//! In-process backends execute a batch inside `submit`, so a backend's job
//! table only ever holds finished jobs. `Running` is reported by runtime
//! jobs whose task has not completed yet.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Still executing.
    Running,
    /// Finished with results.
    Completed,
    /// Finished with an error message.
    Failed(String),
    /// Stopped before finishing.
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => f.write_str("running"),
            JobStatus::Completed => f.write_str("completed"),
            JobStatus::Failed(msg) => write!(f, "failed: {msg}"),
            JobStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// A finished job as recorded in a backend's job table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// The job identifier.
    pub id: JobId,
    /// Backend that ran the job.
    pub backend: String,
    /// Final status.
    pub status: JobStatus,
    /// Shots per circuit.
    pub shots: u32,
    /// Circuits in the batch.
    pub num_circuits: usize,
    /// When `submit` accepted the batch.
    pub submitted_at: DateTime<Utc>,
    /// When execution stopped.
    pub finished_at: DateTime<Utc>,
}

impl Job {
    /// Record a batch accepted at `submitted_at` that just stopped with
    /// `status`.
    pub fn finished(
        id: JobId,
        backend: impl Into<String>,
        submitted_at: DateTime<Utc>,
        status: JobStatus,
    ) -> Self {
        Self {
            id,
            backend: backend.into(),
            status,
            shots: 0,
            num_circuits: 0,
            submitted_at,
            finished_at: Utc::now(),
        }
    }

    /// Set the batch size and shots per circuit.
    pub fn with_batch(mut self, num_circuits: usize, shots: u32) -> Self {
        self.num_circuits = num_circuits;
        self.shots = shots;
        self
    }

    /// Wall-clock time between submission and completion.
    pub fn elapsed(&self) -> TimeDelta {
        self.finished_at - self.submitted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert_eq!(JobStatus::Failed("boom".into()).to_string(), "failed: boom");
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_finished_record() {
        let submitted = Utc::now();
        let job = Job::finished(
            JobId::from("job-123"),
            "local_simulator",
            submitted,
            JobStatus::Completed,
        )
        .with_batch(3, 1000);

        assert_eq!(job.id.to_string(), "job-123");
        assert_eq!(job.backend, "local_simulator");
        assert_eq!(job.num_circuits, 3);
        assert_eq!(job.shots, 1000);
        assert!(job.elapsed() >= TimeDelta::zero());
    }
}
