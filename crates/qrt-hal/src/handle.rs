//! Job handles for the direct backend path.

use async_trait::async_trait;
use tracing::debug;

use qrt_ir::Circuit;

use crate::backend::Backend;
use crate::error::HalResult;
use crate::job::{JobId, JobStatus};
use crate::options::RunOptions;
use crate::result::ExecutionResult;

/// A submitted job bound to the backend that runs it.
pub struct JobHandle<'a, B: ?Sized> {
    backend: &'a B,
    id: JobId,
}

impl<'a, B: Backend + ?Sized> JobHandle<'a, B> {
    /// Wrap an existing job id.
    pub fn new(backend: &'a B, id: JobId) -> Self {
        Self { backend, id }
    }

    /// The job identifier.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Name of the backend running the job.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Current job status.
    pub async fn status(&self) -> HalResult<JobStatus> {
        self.backend.status(&self.id).await
    }

    /// Take the job's result. The backend forgets the job afterwards, so a
    /// second call reports `JobNotFound`.
    pub async fn result(&self) -> HalResult<ExecutionResult> {
        self.backend.wait(&self.id).await
    }

    /// Cancel the job.
    pub async fn cancel(&self) -> HalResult<()> {
        self.backend.cancel(&self.id).await
    }
}

/// Convenience entry point on every backend.
#[async_trait]
pub trait BackendExt: Backend {
    /// Submit `circuits` and return a handle to the job.
    async fn run<'a>(
        &'a self,
        circuits: &[Circuit],
        options: &RunOptions,
    ) -> HalResult<JobHandle<'a, Self>> {
        let id = self.submit(circuits, options).await?;
        debug!("{} accepted job {}", self.name(), id);
        Ok(JobHandle::new(self, id))
    }
}

impl<B: Backend + ?Sized> BackendExt for B {}
