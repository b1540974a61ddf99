//! A dynamically resizable pool of worker tasks consuming jobs from a shared,
//! bounded queue.
//!
//! Mirrors the shape of a classic job-queue worker pool (spawn workers,
//! shut them down on cancellation, report worker count) but adds live
//! resizing: [`WorkerPool::scale`] requests a new steady-state population and
//! the pool's own control loop ([`WorkerPool::run`]) applies the delta.

use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::{Error, ErrorKind, Result};

/// A unit of work a worker runs to completion before picking up the next one.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Worker {
    id: u64,
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Dynamic population of workers draining a capacity-1 job channel.
///
/// `scale` and `submit` are cheap, non-blocking-or-briefly-blocking calls;
/// the actual add/remove of worker tasks happens inside [`WorkerPool::run`],
/// which must be spawned exactly once and driven until `cancellation_token`
/// fires.
pub struct WorkerPool {
    job_tx: mpsc::Sender<Job>,
    job_rx: Arc<AsyncMutex<mpsc::Receiver<Job>>>,
    scale_tx: mpsc::Sender<usize>,
    scale_rx: AsyncMutex<Option<mpsc::Receiver<usize>>>,
    workers: Mutex<Vec<Worker>>,
    next_id: Mutex<u64>,
}

impl WorkerPool {
    pub fn new() -> Self {
        let (job_tx, job_rx) = mpsc::channel(1);
        let (scale_tx, scale_rx) = mpsc::channel(1);
        Self {
            job_tx,
            job_rx: Arc::new(AsyncMutex::new(job_rx)),
            scale_tx,
            scale_rx: AsyncMutex::new(Some(scale_rx)),
            workers: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    /// Enqueues a job. Blocks while the capacity-1 job channel is full — the
    /// deliberate backpressure bound documented alongside the engine.
    pub async fn submit(&self, job: Job) -> Result<()> {
        self.job_tx
            .send(job)
            .await
            .map_err(|_| Error::new(ErrorKind::InternalError, "worker pool job queue is closed"))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.lock().expect("worker pool mutex poisoned").len()
    }

    /// Requests the steady-state population become exactly `n`. Serialized
    /// through a capacity-1 channel that [`WorkerPool::run`] drains; a
    /// pending, not-yet-applied request is superseded by the latest one.
    #[instrument(skip(self))]
    pub async fn scale(&self, n: usize) -> Result<()> {
        self.scale_tx
            .send(n)
            .await
            .map_err(|_| Error::new(ErrorKind::InternalError, "worker pool is not running"))
    }

    /// Runs the pool's control loop until `cancellation_token` fires. Must be
    /// called exactly once, typically spawned as its own task by the worker
    /// controller.
    #[instrument(skip(self, cancellation_token))]
    pub async fn run(&self, cancellation_token: CancellationToken) {
        let mut scale_rx = self
            .scale_rx
            .lock()
            .await
            .take()
            .expect("WorkerPool::run must be called exactly once");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    debug!("worker pool control loop cancelled");
                    break;
                }
                target = scale_rx.recv() => {
                    match target {
                        Some(n) => self.apply_scale(n, &cancellation_token).await,
                        None => break,
                    }
                }
            }
        }

        self.shutdown_all().await;
    }

    async fn apply_scale(&self, target: usize, cancellation_token: &CancellationToken) {
        let current = self.worker_count();
        trace!(current, target, "applying scale request");
        match target.cmp(&current) {
            Ordering::Greater => {
                for _ in current..target {
                    self.spawn_worker(cancellation_token.clone());
                }
                info!(workers = self.worker_count(), "scaled up");
            }
            Ordering::Less => {
                for _ in target..current {
                    self.retire_last_worker();
                }
                info!(workers = self.worker_count(), "scaled down");
            }
            Ordering::Equal => {}
        }
    }

    /// Spawns one worker. Ids are assigned under the same lock as the worker
    /// list and are never reused, even across scale-down/scale-up cycles.
    fn spawn_worker(&self, cancellation_token: CancellationToken) {
        let id = {
            let mut next_id = self.next_id.lock().expect("worker id mutex poisoned");
            let id = *next_id;
            *next_id += 1;
            id
        };
        let (stop_tx, stop_rx) = oneshot::channel();
        let job_rx = Arc::clone(&self.job_rx);
        let handle = tokio::spawn(worker_loop(id, job_rx, stop_rx, cancellation_token));
        self.workers
            .lock()
            .expect("worker pool mutex poisoned")
            .push(Worker { id, stop_tx, handle });
    }

    /// Removes the highest-numbered (most recently added) worker first,
    /// matching the LIFO scale-down policy.
    fn retire_last_worker(&self) {
        let worker = self.workers.lock().expect("worker pool mutex poisoned").pop();
        if let Some(worker) = worker {
            trace!(id = worker.id, "retiring worker");
            let _ = worker.stop_tx.send(());
        }
    }

    async fn shutdown_all(&self) {
        let workers = std::mem::take(&mut *self.workers.lock().expect("worker pool mutex poisoned"));
        let worker_count = workers.len();
        if worker_count == 0 {
            return;
        }
        debug!(worker_count, "waiting for workers to shut down");

        let join_all = async {
            for worker in workers {
                let _ = worker.handle.await;
            }
        };
        tokio::select! {
            _ = join_all => {
                info!(worker_count, "all workers shut down");
            }
            _ = tokio::time::sleep(Duration::from_secs(30)) => {
                warn!(worker_count, "worker shutdown timed out after 30 seconds");
            }
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A worker's lifecycle: on every iteration, race its stop signal, the
/// engine cancellation token, and the shared job channel. A job never
/// carries state into the next one, and a failing job never takes the
/// worker down with it — the job is expected to handle (log) its own
/// errors, so this loop has nothing to catch.
async fn worker_loop(
    id: u64,
    job_rx: Arc<AsyncMutex<mpsc::Receiver<Job>>>,
    mut stop_rx: oneshot::Receiver<()>,
    cancellation_token: CancellationToken,
) {
    trace!(id, "worker started");
    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => {
                trace!(id, "worker stopped");
                return;
            }
            _ = cancellation_token.cancelled() => {
                trace!(id, "worker cancelled");
                return;
            }
            maybe_job = async {
                let mut rx = job_rx.lock().await;
                rx.recv().await
            } => {
                match maybe_job {
                    Some(job) => job.await,
                    None => {
                        trace!(id, "job queue closed");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[tokio::test]
    async fn scale_up_reaches_exact_count() {
        let pool = Arc::new(WorkerPool::new());
        let token = CancellationToken::new();
        let run_pool = Arc::clone(&pool);
        let run_token = token.clone();
        let handle = tokio::spawn(async move { run_pool.run(run_token).await });

        pool.scale(5).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(pool.worker_count(), 5);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn scale_down_removes_highest_ids_first() {
        let pool = Arc::new(WorkerPool::new());
        let token = CancellationToken::new();
        let run_pool = Arc::clone(&pool);
        let run_token = token.clone();
        let handle = tokio::spawn(async move { run_pool.run(run_token).await });

        pool.scale(4).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let ids_before: Vec<u64> = pool
            .workers
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids_before, vec![0, 1, 2, 3]);

        pool.scale(2).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let ids_after: Vec<u64> = pool
            .workers
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids_after, vec![0, 1]);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn submitted_jobs_each_run_exactly_once() {
        let pool = Arc::new(WorkerPool::new());
        let token = CancellationToken::new();
        let run_pool = Arc::clone(&pool);
        let run_token = token.clone();
        let handle = tokio::spawn(async move { run_pool.run(run_token).await });

        pool.scale(3).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.submit(Box::pin(async move {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
            }))
            .await
            .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 10);

        token.cancel();
        handle.await.unwrap();
    }

    /// For all `n`, once `scale(n)` quiesces the pool holds exactly `n`
    /// workers — the invariant the reconcilers and `WorkerController` both
    /// lean on. Bounded to a small range so the property runs quickly.
    #[quickcheck_macros::quickcheck]
    fn scale_quiesces_to_the_requested_count(n: u8) -> bool {
        let n = (n % 16) as usize;
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("current-thread runtime should build")
            .block_on(async move {
                let pool = Arc::new(WorkerPool::new());
                let token = CancellationToken::new();
                let run_pool = Arc::clone(&pool);
                let run_token = token.clone();
                let handle = tokio::spawn(async move { run_pool.run(run_token).await });

                pool.scale(n).await.unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
                let observed = pool.worker_count();

                token.cancel();
                handle.await.unwrap();
                observed == n
            })
    }
}
