//! The facade owning the engine's lifecycle and exposing the operator API
//! the CLI drives.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::db::articles::ArticleRepo;
use crate::db::config::ConfigRepo;
use crate::db::feeds::FeedRepo;
use crate::domain::article::Article;
use crate::domain::config::RssConfig;
use crate::domain::feed::{Feed, NewFeed};
use crate::engine::reconciler;
use crate::engine::ticker_controller::TickerController;
use crate::engine::worker_controller::WorkerController;
use crate::engine::worker_pool::WorkerPool;
use crate::fetcher::Fetcher;
use crate::{Error, ErrorKind, Result};

/// The lower bound `set_interval` enforces.
pub const MIN_INTERVAL: Duration = Duration::from_secs(120);
/// The inclusive bounds `resize` enforces.
pub const MIN_WORKERS: i32 = 1;
pub const MAX_WORKERS: i32 = 10_000;
/// The deadline every one-shot command enforces against the store.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Aggregator {
    feed_repo: FeedRepo,
    article_repo: ArticleRepo,
    config_repo: ConfigRepo,
    fetcher: Fetcher,
    running: Mutex<Option<RunningEngine>>,
}

struct RunningEngine {
    cancellation_token: CancellationToken,
    join_set: JoinSet<()>,
}

impl Aggregator {
    pub fn new(feed_repo: FeedRepo, article_repo: ArticleRepo, config_repo: ConfigRepo, fetcher: Fetcher) -> Self {
        Self {
            feed_repo,
            article_repo,
            config_repo,
            fetcher,
            running: Mutex::new(None),
        }
    }

    /// Starts the engine: the ticker controller, worker controller, and both
    /// reconcilers, all tracked by one join set and cancelled together.
    pub async fn start(&self) -> Result<()> {
        let config = Self::classify_config_read(self.config_repo.get())?;
        if config.run {
            return Err(Error::new(
                ErrorKind::ProcessAlreadyRunning,
                "process already running",
            ));
        }

        self.config_repo.update_run_status(true).map_err(|_| {
            Error::new(ErrorKind::FailedToUpdateStatus, "failed to update status")
        })?;

        let cancellation_token = CancellationToken::new();
        let pool = Arc::new(WorkerPool::new());
        let ticker_controller = Arc::new(TickerController::new(
            config.poll_period(),
            self.feed_repo.clone(),
            self.article_repo.clone(),
            self.fetcher.clone(),
        ));
        let worker_controller = Arc::new(WorkerController::new(Arc::clone(&pool)));

        let mut join_set = JoinSet::new();

        join_set.spawn({
            let ticker_controller = Arc::clone(&ticker_controller);
            let pool = Arc::clone(&pool);
            let token = cancellation_token.clone();
            async move { ticker_controller.run(pool, token).await }
        });

        join_set.spawn({
            let worker_controller = Arc::clone(&worker_controller);
            let token = cancellation_token.clone();
            let initial_count = config.worker_count.max(0) as usize;
            async move { worker_controller.run(initial_count, token).await }
        });

        join_set.spawn({
            let config_repo = self.config_repo.clone();
            let interval_tx = ticker_controller.interval_sender();
            let token = cancellation_token.clone();
            let current_interval = config.poll_period();
            async move { reconciler::run_interval_reconciler(config_repo, interval_tx, current_interval, token).await }
        });

        join_set.spawn({
            let config_repo = self.config_repo.clone();
            let count_tx = worker_controller.count_sender();
            let token = cancellation_token.clone();
            let current_count = config.worker_count;
            async move { reconciler::run_count_reconciler(config_repo, count_tx, current_count, token).await }
        });

        info!(
            "The background process for fetching feeds has started (interval={:?}, workers={})",
            config.poll_period(),
            config.worker_count
        );

        *self.running.lock().expect("aggregator mutex poisoned") = Some(RunningEngine {
            cancellation_token,
            join_set,
        });
        Ok(())
    }

    /// Cancels the engine's token and waits for every task to return.
    /// Idempotent once the engine has already been stopped.
    pub async fn stop(&self) -> Result<()> {
        let running = self.running.lock().expect("aggregator mutex poisoned").take();
        let Some(RunningEngine { cancellation_token, mut join_set }) = running else {
            return Ok(());
        };

        cancellation_token.cancel();
        while join_set.join_next().await.is_some() {}

        self.config_repo.update_run_status(false).map_err(|_| {
            Error::new(ErrorKind::FailedToUpdateStatus, "failed to update status")
        })
    }

    /// Starts the engine, blocks until an OS shutdown signal arrives, then
    /// stops it. Used by the `fetch` CLI subcommand.
    pub async fn run_until_signal(&self) -> Result<()> {
        self.start().await?;
        wait_for_shutdown_signal().await;
        info!("graceful shutdown completed");
        self.stop().await
    }

    pub async fn add_feed(&self, name: &str, description: &str, url: &str) -> Result<()> {
        let feed_repo = self.feed_repo.clone();
        let new_feed = NewFeed {
            name: name.to_owned(),
            description: description.to_owned(),
            url: url.to_owned(),
        };
        Self::with_deadline(move || {
            if feed_repo.exist(&new_feed.name)? {
                return Err(Error::new(ErrorKind::FeedNotUnique, "feed already exist"));
            }
            feed_repo.create(new_feed)?;
            Ok(())
        })
        .await
    }

    pub async fn delete_feed(&self, name: &str) -> Result<()> {
        let feed_repo = self.feed_repo.clone();
        let name = name.to_owned();
        Self::with_deadline(move || feed_repo.delete(&name)).await
    }

    /// `num == 0` returns every feed; otherwise the `num` most recent.
    pub async fn list_feeds(&self, num: i64) -> Result<Vec<Feed>> {
        let feed_repo = self.feed_repo.clone();
        Self::with_deadline(move || {
            let feeds = feed_repo.list(num)?;
            if feeds.is_empty() {
                return Err(Error::new(ErrorKind::NoFeeds, "no feeds found"));
            }
            Ok(feeds)
        })
        .await
    }

    /// `num == 0` returns every article; otherwise the `num` most recent by
    /// publication date.
    pub async fn get_articles(&self, feed_name: &str, num: i64) -> Result<Vec<Article>> {
        let article_repo = self.article_repo.clone();
        let feed_name = feed_name.to_owned();
        Self::with_deadline(move || {
            let articles = article_repo.list(&feed_name, num)?;
            if articles.is_empty() {
                return Err(Error::new(ErrorKind::NoArticles, "no articles found"));
            }
            Ok(articles)
        })
        .await
    }

    pub async fn set_interval(&self, new_interval: Duration) -> Result<Duration> {
        if new_interval < MIN_INTERVAL {
            return Err(Error::new(
                ErrorKind::InvalidInterval,
                "interval must be at least 2 min",
            ));
        }
        let config_repo = self.config_repo.clone();
        let old_interval =
            Self::with_deadline(move || config_repo.update_timer_interval(new_interval)).await?;
        info!(
            "Timer interval changed from {:?} to {:?}",
            old_interval, new_interval
        );
        Ok(old_interval)
    }

    pub async fn resize(&self, workers: i32) -> Result<i32> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(Error::new(
                ErrorKind::InvalidWorkerCount,
                "worker count must be between 1 and 10000",
            ));
        }
        let config_repo = self.config_repo.clone();
        let old_count = Self::with_deadline(move || config_repo.update_worker_count(workers)).await?;
        info!("Number of workers changed from {} to {}", old_count, workers);
        Ok(old_count)
    }

    pub async fn get_config(&self) -> Result<RssConfig> {
        let config_repo = self.config_repo.clone();
        Self::with_deadline(move || Self::classify_config_read(config_repo.get())).await
    }

    /// Classifies a config read failure that isn't "row missing" as
    /// `FailedToReadConfig` rather than letting a raw connection/query error
    /// escape unclassified.
    fn classify_config_read(result: Result<RssConfig>) -> Result<RssConfig> {
        result.map_err(|err| {
            if err.kind() == Some(ErrorKind::ConfigNotFound) {
                err
            } else {
                Error::new(ErrorKind::FailedToReadConfig, "failed to read config")
            }
        })
    }

    /// Runs `f` on the blocking pool and bounds the whole call — connection
    /// checkout plus the query itself — to [`COMMAND_TIMEOUT`], the 5-second
    /// deadline one-shot commands carry against the store. The engine's own
    /// polling-path repository access (ticker controller, reconcilers) never
    /// goes through this and stays unbounded.
    async fn with_deadline<T, F>(f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        match tokio::time::timeout(COMMAND_TIMEOUT, tokio::task::spawn_blocking(f)).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::new(ErrorKind::InternalError, "store task panicked")),
            Err(_) => Err(Error::new(ErrorKind::InternalError, "store operation timed out")),
        }
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
