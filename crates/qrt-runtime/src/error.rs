//! Error types for the runtime crate.

use thiserror::Error;

use qrt_hal::HalError;
use qrt_ir::IrError;

/// Errors raised by the runtime service and primitives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Backend or job error.
    #[error(transparent)]
    Hal(#[from] HalError),

    /// Circuit or observable error.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Invalid argument to a primitive.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A sampled circuit has nothing to sample.
    #[error("Circuit '{0}' has no measurements")]
    NoMeasurements(String),

    /// Unknown channel name.
    #[error("Unknown channel '{0}' (expected ibm_quantum, ibm_cloud or local)")]
    UnknownChannel(String),

    /// Missing or rejected account data.
    #[error("Account error: {0}")]
    Account(String),

    /// A primitive was run outside a Tokio runtime.
    #[error("No Tokio runtime available to run the job")]
    NoRuntime,

    /// The job task failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Account file error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
