//! Composes the variable ticker and the worker pool into the polling loop:
//! on every tick, submit one fetch job per stale feed; on an interval
//! change, reset the ticker; on cancellation, stop and return.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::db::articles::ArticleRepo;
use crate::db::feeds::FeedRepo;
use crate::domain::article::NewArticle;
use crate::domain::feed::Feed;
use crate::engine::ticker::VariableTicker;
use crate::engine::worker_pool::{Job, WorkerPool};
use crate::fetcher::Fetcher;
use crate::{Error, ErrorKind};

pub struct TickerController {
    ticker: VariableTicker,
    feed_repo: FeedRepo,
    article_repo: ArticleRepo,
    fetcher: Fetcher,
    interval_tx: mpsc::Sender<Duration>,
    interval_rx: AsyncMutex<Option<mpsc::Receiver<Duration>>>,
}

impl TickerController {
    pub fn new(
        initial_period: Duration,
        feed_repo: FeedRepo,
        article_repo: ArticleRepo,
        fetcher: Fetcher,
    ) -> Self {
        let (interval_tx, interval_rx) = mpsc::channel(1);
        Self {
            ticker: VariableTicker::new(initial_period),
            feed_repo,
            article_repo,
            fetcher,
            interval_tx,
            interval_rx: AsyncMutex::new(Some(interval_rx)),
        }
    }

    /// The capacity-1 channel the interval reconciler sends persisted
    /// interval changes into.
    pub fn interval_sender(&self) -> mpsc::Sender<Duration> {
        self.interval_tx.clone()
    }

    /// Runs the scheduling loop until `cancellation_token` fires. Must be
    /// called exactly once.
    #[instrument(skip_all)]
    pub async fn run(self: Arc<Self>, pool: Arc<WorkerPool>, cancellation_token: CancellationToken) {
        let mut tick_rx = self.ticker.take_receiver();
        let mut interval_rx = self
            .interval_rx
            .lock()
            .await
            .take()
            .expect("TickerController::run must be called exactly once");

        let clock = Arc::clone(&self);
        let clock_token = cancellation_token.clone();
        let clock_handle = tokio::spawn(async move {
            tokio::select! {
                _ = clock.ticker.run() => {}
                _ = clock_token.cancelled() => {}
            }
        });

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    debug!("ticker controller cancelled");
                    break;
                }
                Some(new_period) = interval_rx.recv() => {
                    let old_period = self.ticker.period();
                    self.ticker.reset(new_period);
                    info!(
                        "Interval of fetching feeds changed from {:?} to {:?}",
                        old_period, new_period
                    );
                }
                Some(()) = tick_rx.recv() => {
                    self.on_tick(&pool).await;
                }
                else => break,
            }
        }

        self.ticker.stop();
        let _ = clock_handle.await;
    }

    async fn on_tick(&self, pool: &WorkerPool) {
        let period = chrono::Duration::from_std(self.ticker.period()).unwrap_or(chrono::Duration::zero());
        let stale_feeds = match self.feed_repo.get_stale_feeds(period) {
            Ok(feeds) => feeds,
            Err(err) => {
                error!(%err, "failed to read stale feeds");
                return;
            }
        };

        for feed in stale_feeds {
            let fetcher = self.fetcher.clone();
            let feed_repo = self.feed_repo.clone();
            let article_repo = self.article_repo.clone();
            let job: Job = Box::pin(async move {
                fetch_feed_job(feed, fetcher, feed_repo, article_repo).await;
            });
            if pool.submit(job).await.is_err() {
                warn!("job queue closed while submitting fetch jobs; pool is shutting down");
                return;
            }
        }
    }
}

/// The fetch job run per stale feed. Errors at any step are logged and
/// swallowed: a bad feed never takes the worker, or the engine, down with
/// it, and an untouched `updated_at` means the next tick retries it.
async fn fetch_feed_job(feed: Feed, fetcher: Fetcher, feed_repo: FeedRepo, article_repo: ArticleRepo) {
    let document = match fetcher.fetch(&feed.url).await {
        Ok(document) => document,
        Err(err) => {
            warn!(feed = %feed.name, %err, "feed fetch failed");
            return;
        }
    };

    if document.channel.items.is_empty() {
        let err = Error::new(ErrorKind::EmptyFeed, "feed document had no items");
        debug!(feed = %feed.name, %err);
        return;
    }

    let articles: Vec<NewArticle> = document
        .channel
        .items
        .into_iter()
        .map(|item| NewArticle {
            title: item.title,
            link: item.link,
            description: item.description,
            published_at: item.pub_date,
            feed_id: feed.id,
        })
        .collect();

    if let Err(err) = article_repo.create_or_update(feed.id, articles) {
        warn!(feed = %feed.name, %err, "failed to persist articles");
        return;
    }

    if let Err(err) = feed_repo.update_updated_at(&feed.name) {
        warn!(feed = %feed.name, %err, "failed to update feed timestamp");
    }
}
