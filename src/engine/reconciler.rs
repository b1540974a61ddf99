//! Two independent, 2-second-cadence loops that resynchronize the live
//! engine from the durable config row, regardless of who last wrote it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::db::config::ConfigRepo;

const CADENCE: Duration = Duration::from_secs(2);

/// Keeps a cached `current_interval`; on each cadence, reads the config row
/// and — if the persisted interval differs — attempts a non-blocking send
/// into the ticker controller's interval channel. The cache only advances
/// on a successful send, so a dropped update retries on the next cadence.
pub async fn run_interval_reconciler(
    config_repo: ConfigRepo,
    interval_tx: mpsc::Sender<Duration>,
    mut current_interval: Duration,
    cancellation_token: CancellationToken,
) {
    let mut cadence = tokio::time::interval(CADENCE);
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => return,
            _ = cadence.tick() => {
                match config_repo.get() {
                    Ok(config) => {
                        let persisted = config.poll_period();
                        if persisted != current_interval {
                            match interval_tx.try_send(persisted) {
                                Ok(()) => current_interval = persisted,
                                Err(mpsc::error::TrySendError::Full(_)) => {}
                                Err(mpsc::error::TrySendError::Closed(_)) => return,
                            }
                        }
                    }
                    Err(err) => warn!(%err, "interval reconciler failed to read config"),
                }
            }
        }
    }
}

/// Symmetrical to [`run_interval_reconciler`], for `worker_count`.
pub async fn run_count_reconciler(
    config_repo: ConfigRepo,
    count_tx: mpsc::Sender<usize>,
    mut current_count: i32,
    cancellation_token: CancellationToken,
) {
    let mut cadence = tokio::time::interval(CADENCE);
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => return,
            _ = cadence.tick() => {
                match config_repo.get() {
                    Ok(config) => {
                        if config.worker_count != current_count {
                            match count_tx.try_send(config.worker_count.max(0) as usize) {
                                Ok(()) => current_count = config.worker_count,
                                Err(mpsc::error::TrySendError::Full(_)) => {}
                                Err(mpsc::error::TrySendError::Closed(_)) => return,
                            }
                        }
                    }
                    Err(err) => warn!(%err, "count reconciler failed to read config"),
                }
            }
        }
    }
}
