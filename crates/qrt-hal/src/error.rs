//! HAL errors.

use thiserror::Error;

/// Errors raised by backends and their registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No backend of that name, or it is not accepting jobs.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Missing or rejected token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Bad backend or noise configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The circuit cannot run on this backend.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// More qubits than the backend or method allows.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Shot count outside the accepted range.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// The backend does not offer this operation.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Unknown job id, or its result was already collected.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The job ran and failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled before finishing.
    #[error("Job cancelled")]
    JobCancelled,

    #[error(transparent)]
    Ir(#[from] qrt_ir::IrError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal simulator failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
