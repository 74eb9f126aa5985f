//! Handles to running primitive jobs.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use qrt_hal::JobStatus;

use crate::error::{RuntimeError, RuntimeResult};

enum JobState<R> {
    Running(JoinHandle<RuntimeResult<R>>),
    Done(Result<R, String>),
    Cancelled,
}

/// A primitive job running on the Tokio runtime.
///
/// The handle can be cloned; every clone observes the same job.
pub struct RuntimeJob<R> {
    job_id: String,
    backend: String,
    state: Arc<Mutex<JobState<R>>>,
    // Set when the task stops; readable while `result()` holds the state.
    finished: Arc<AtomicBool>,
}

impl<R> Clone for RuntimeJob<R> {
    fn clone(&self) -> Self {
        Self {
            job_id: self.job_id.clone(),
            backend: self.backend.clone(),
            state: Arc::clone(&self.state),
            finished: Arc::clone(&self.finished),
        }
    }
}

impl<R: Clone + Send + 'static> RuntimeJob<R> {
    /// Spawn `work` on the current runtime.
    pub(crate) fn spawn<F>(backend: impl Into<String>, work: F) -> RuntimeResult<Self>
    where
        F: Future<Output = RuntimeResult<R>> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?;
        let job_id = Uuid::new_v4().to_string();
        let backend = backend.into();
        debug!("Spawning runtime job {} on {}", job_id, backend);
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let task = runtime.spawn(async move {
            let outcome = work.await;
            flag.store(true, Ordering::Release);
            outcome
        });
        Ok(Self {
            job_id,
            backend,
            state: Arc::new(Mutex::new(JobState::Running(task))),
            finished,
        })
    }

    /// The job identifier.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Name of the backend running the job.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// True once the job reached a terminal state.
    pub fn done(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Current status.
    pub async fn status(&self) -> JobStatus {
        match &*self.state.lock().await {
            JobState::Running(handle) if handle.is_finished() => JobStatus::Completed,
            JobState::Running(_) => JobStatus::Running,
            JobState::Done(Ok(_)) => JobStatus::Completed,
            JobState::Done(Err(msg)) => JobStatus::Failed(msg.clone()),
            JobState::Cancelled => JobStatus::Cancelled,
        }
    }

    /// Abort the job if it is still running.
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        if let JobState::Running(handle) = &*state {
            if !handle.is_finished() {
                handle.abort();
                self.finished.store(true, Ordering::Release);
                debug!("Cancelled runtime job {}", self.job_id);
                *state = JobState::Cancelled;
            }
        }
    }

    /// Wait for the job and return its result.
    pub async fn result(&self) -> RuntimeResult<R> {
        let mut state = self.state.lock().await;
        if let JobState::Running(handle) = &mut *state {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => Err(RuntimeError::JobCancelled),
                Err(e) => Err(RuntimeError::JobFailed(e.to_string())),
            };
            self.finished.store(true, Ordering::Release);
            *state = match &outcome {
                Ok(value) => JobState::Done(Ok(value.clone())),
                Err(RuntimeError::JobCancelled) => JobState::Cancelled,
                Err(e) => JobState::Done(Err(e.to_string())),
            };
            return outcome;
        }
        match &*state {
            JobState::Done(Ok(value)) => Ok(value.clone()),
            JobState::Done(Err(msg)) => Err(RuntimeError::JobFailed(msg.clone())),
            JobState::Cancelled | JobState::Running(_) => Err(RuntimeError::JobCancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_result_is_cached() {
        let job = RuntimeJob::spawn("test", async { Ok(41 + 1) }).unwrap();
        assert_eq!(job.backend(), "test");
        assert_eq!(job.result().await.unwrap(), 42);
        assert!(job.done());
        assert_eq!(job.clone().result().await.unwrap(), 42);
        assert_eq!(job.status().await, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let job: RuntimeJob<u32> = RuntimeJob::spawn("test", async {
            Err(RuntimeError::InvalidArgument("bad".into()))
        })
        .unwrap();
        assert!(matches!(
            job.result().await,
            Err(RuntimeError::InvalidArgument(_))
        ));
        assert!(matches!(job.result().await, Err(RuntimeError::JobFailed(_))));
        assert!(matches!(job.status().await, JobStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_cancel() {
        let job: RuntimeJob<u32> = RuntimeJob::spawn("test", async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0)
        })
        .unwrap();
        assert!(!job.done());
        job.cancel().await;
        assert!(job.done());
        assert!(matches!(job.result().await, Err(RuntimeError::JobCancelled)));
    }

    #[tokio::test]
    async fn test_done_while_result_is_awaited() {
        let job = RuntimeJob::spawn("test", async { Ok(7) }).unwrap();
        let _awaiting = job.state.lock().await;
        for _ in 0..100 {
            if job.done() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(job.done());
    }

    #[test]
    fn test_no_runtime() {
        let job = RuntimeJob::spawn("test", async { Ok(()) });
        assert!(matches!(job, Err(RuntimeError::NoRuntime)));
    }
}
