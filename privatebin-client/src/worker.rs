//! Bounded pool for CPU-bound crypto work in the async client.

use crate::error::{PasteError, PasteResult};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// Runs blocking jobs off the async scheduler, at most `size` at a time.
///
/// Jobs go to tokio's blocking threads, either on the runtime the caller
/// awaits from or on a runtime the caller hands in. The semaphore keeps the
/// number of concurrently running crypto jobs bounded.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    handle: Option<Handle>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            handle: None,
            size,
        }
    }

    /// Runs jobs on the blocking threads of a caller-owned runtime.
    pub fn on_runtime(handle: Handle, size: usize) -> Self {
        Self {
            handle: Some(handle),
            ..Self::new(size)
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of jobs that could start right now without waiting.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Runs `job` on a worker and resumes the caller when it finishes.
    pub async fn run<F, T>(&self, job: F) -> PasteResult<T>
    where
        F: FnOnce() -> PasteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PasteError::Worker("worker pool is closed".to_string()))?;

        // The permit moves into the job so it is held until the job ends,
        // even if the awaiting task is dropped first.
        let task = move || {
            let _permit = permit;
            job()
        };
        let joined = match &self.handle {
            Some(handle) => handle.spawn_blocking(task).await,
            None => tokio::task::spawn_blocking(task).await,
        };
        joined.map_err(|e| PasteError::Worker(e.to_string()))?
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        let size = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(size)
    }
}
