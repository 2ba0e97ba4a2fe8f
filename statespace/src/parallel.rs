//! Parallel execution of independent propagation jobs
//!
//! Impulse responses for different shocks share nothing but a read-only
//! system, so a batch can be spread over rayon's pool. Results always come
//! back in job order, independent of thread count or scheduling.
//!
//! ```rust
//! use statespace::parallel::BatchRunner;
//! use statespace::{LinearSystem, Propagation, TransitionMatrix};
//!
//! let system = LinearSystem::new(TransitionMatrix::<2>::identity(), Propagation::PureMatrix);
//! let impulses = [[1.0, 0.0], [0.0, 1.0]];
//!
//! let results = BatchRunner::new(impulses.len(), |job| {
//!     system.impulse_response(&impulses[job], 10)
//! })
//! .num_threads(2)
//! .run();
//!
//! assert_eq!(results.len(), 2);
//! ```
//!
//! A panic inside one job is caught and returned as `Err(String)`; the other
//! jobs still complete.

use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Runs `num_jobs` calls of `job(job_id)` on rayon's pool
pub struct BatchRunner<S, F>
where
    F: Fn(usize) -> S + Send + Sync,
    S: Send,
{
    num_jobs: usize,
    job: F,
    num_threads: Option<usize>,
    progress_callback: Option<ProgressCallback>,
    _output: PhantomData<fn() -> S>,
}

impl<S, F> BatchRunner<S, F>
where
    F: Fn(usize) -> S + Send + Sync,
    S: Send,
{
    pub fn new(num_jobs: usize, job: F) -> Self {
        BatchRunner {
            num_jobs,
            job,
            num_threads: None,
            progress_callback: None,
            _output: PhantomData,
        }
    }

    /// Use a dedicated pool of `n` threads instead of the global pool
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Called with `(completed, total)` after each job finishes
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Execute every job and return results in job order
    pub fn run(self) -> Vec<Result<S, String>> {
        let completed = AtomicUsize::new(0);

        let execute = || {
            (0..self.num_jobs)
                .into_par_iter()
                .map(|job_id| {
                    let job = std::panic::AssertUnwindSafe(|| (self.job)(job_id));
                    let result = std::panic::catch_unwind(job);

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(done, self.num_jobs);
                    }

                    result.map_err(|panic| {
                        if let Some(s) = panic.downcast_ref::<&str>() {
                            s.to_string()
                        } else if let Some(s) = panic.downcast_ref::<String>() {
                            s.clone()
                        } else {
                            "Unknown panic".to_string()
                        }
                    })
                })
                .collect::<Vec<_>>()
        };

        let pool = self.num_threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| {
                    warn!(threads = n, error = %e, "Falling back to global pool");
                })
                .ok()
        });

        match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        }
    }
}

/// Progress callback that logs every `interval` completed jobs
pub fn logging_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync + 'static {
    let interval = interval.max(1);
    move |completed, total| {
        if completed % interval == 0 || completed == total {
            info!(completed, total, "Batch progress");
        }
    }
}
