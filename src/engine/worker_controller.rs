//! A thin lifecycle wrapper around the worker pool: starts the pool's
//! control loop, applies the initial count, then forwards persisted count
//! changes to it until cancelled.

use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::engine::worker_pool::WorkerPool;

pub struct WorkerController {
    pool: Arc<WorkerPool>,
    count_tx: mpsc::Sender<usize>,
    count_rx: AsyncMutex<Option<mpsc::Receiver<usize>>>,
}

impl WorkerController {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        let (count_tx, count_rx) = mpsc::channel(1);
        Self {
            pool,
            count_tx,
            count_rx: AsyncMutex::new(Some(count_rx)),
        }
    }

    /// The capacity-1 channel the count reconciler sends persisted worker
    /// count changes into.
    pub fn count_sender(&self) -> mpsc::Sender<usize> {
        self.count_tx.clone()
    }

    #[instrument(skip(self, cancellation_token))]
    pub async fn run(&self, initial_count: usize, cancellation_token: CancellationToken) {
        let pool_handle = {
            let pool = Arc::clone(&self.pool);
            let token = cancellation_token.clone();
            tokio::spawn(async move { pool.run(token).await })
        };

        if let Err(err) = self.pool.scale(initial_count).await {
            error!(%err, "failed to apply initial worker count");
        }

        let mut count_rx = self
            .count_rx
            .lock()
            .await
            .take()
            .expect("WorkerController::run must be called exactly once");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    debug!("worker controller cancelled");
                    break;
                }
                Some(n) = count_rx.recv() => {
                    if let Err(err) = self.pool.scale(n).await {
                        error!(%err, "failed to apply worker count change");
                    }
                }
                else => break,
            }
        }

        let _ = pool_handle.await;
    }
}
