//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for running circuits:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `estimate()` | async | provided | `HalResult<ExpectationResult>` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use qrt_ir::{Circuit, SparsePauliOp};

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::options::RunOptions;
use crate::result::{ExecutionResult, ExpectationResult};

/// Configuration for a backend instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Service endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Backend-specific settings such as `method` or `seed_simulator`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an extra string setting.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read an extra unsigned setting.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// Trait for backends that run circuits.
///
/// - `capabilities()` is synchronous and infallible; implementations cache
///   capabilities at construction time.
/// - `submit()` runs a batch of circuits to completion and returns a job
///   id; results come back in submission order.
/// - `result()` hands the stored result over once and forgets the job;
///   later lookups of the same id report `JobNotFound`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a batch of circuits for execution.
    async fn submit(&self, circuits: &[Circuit], options: &RunOptions) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Take the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a job. Finished jobs are left as they are.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Exact expectation values of `observables` in the state prepared by
    /// `circuit` (measurements ignored).
    ///
    /// Backends without direct state access report `Unsupported`, and
    /// callers fall back to sampling.
    async fn estimate(
        &self,
        circuit: &Circuit,
        observables: &[SparsePauliOp],
    ) -> HalResult<ExpectationResult> {
        let _ = (circuit, observables);
        Err(HalError::Unsupported(format!(
            "{} does not provide exact expectation values",
            self.name()
        )))
    }

    /// Collect the result of a submitted job.
    ///
    /// Backends finish a batch inside `submit`, so there is nothing to poll:
    /// a job that still reports `Running` here is an error.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        match self.status(job_id).await? {
            JobStatus::Completed => self.result(job_id).await,
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            JobStatus::Running => Err(HalError::Backend(format!(
                "job {job_id} is still running after submit returned"
            ))),
        }
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a local backend: zero queue, zero wait.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
    /// Circuit would need transpilation to match the device.
    RequiresTranspilation {
        /// What transpilation is needed.
        details: String,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid (can be submitted as-is).
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Check if the circuit can run at all.
    pub fn is_runnable(&self) -> bool {
        !matches!(self, ValidationResult::Invalid { .. })
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("local_simulator")
            .with_token("secret-token")
            .with_extra("method", serde_json::json!("stabilizer"))
            .with_extra("seed_simulator", serde_json::json!(7));

        assert_eq!(config.name, "local_simulator");
        assert_eq!(config.extra_str("method"), Some("stabilizer"));
        assert_eq!(config.extra_u64("seed_simulator"), Some(7));
        assert_eq!(config.extra_u64("method"), None);
    }

    #[test]
    fn test_backend_config_debug_redacts_token() {
        let config = BackendConfig::new("x").with_token("secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_backend_availability() {
        let avail = BackendAvailability::always_available();
        assert!(avail.is_available);
        assert_eq!(avail.queue_depth, Some(0));

        let down = BackendAvailability::unavailable("maintenance");
        assert!(!down.is_available);
        assert_eq!(down.status_message, Some("maintenance".to_string()));
    }

    #[test]
    fn test_validation_result() {
        assert!(ValidationResult::Valid.is_valid());
        let needs = ValidationResult::RequiresTranspilation {
            details: String::new(),
        };
        assert!(!needs.is_valid());
        assert!(needs.is_runnable());
        assert!(!ValidationResult::Invalid { reasons: vec![] }.is_runnable());
    }
}
