use clap::Parser;

use rsshub::cli::{Cli, Commands};
use rsshub::configuration::get_configuration;
use rsshub::db::articles::ArticleRepo;
use rsshub::db::config::ConfigRepo;
use rsshub::db::connection::create_pool_from_settings;
use rsshub::db::feeds::FeedRepo;
use rsshub::db::migrations::run_pending;
use rsshub::engine::Aggregator;
use rsshub::fetcher::Fetcher;
use rsshub::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    rsshub::telemetry::init_tracing()?;

    let cli = Cli::parse();
    let settings = get_configuration()?;
    let pool = create_pool_from_settings(&settings.database)?;
    run_pending(&mut pool.get()?)?;

    let feed_repo = FeedRepo::new(pool.clone());
    let article_repo = ArticleRepo::new(pool.clone());
    let config_repo = ConfigRepo::new(pool.clone());
    let fetcher = Fetcher::from_env();
    let aggregator = Aggregator::new(feed_repo, article_repo, config_repo, fetcher);

    match cli.command {
        Commands::Fetch => {
            aggregator.run_until_signal().await?;
        }
        Commands::Add { name, url, desc } => {
            aggregator.add_feed(&name, &desc, &url).await?;
            println!("Feed {name} added successfully");
        }
        Commands::Delete { name } => {
            aggregator.delete_feed(&name).await?;
            println!("Feed {name} deleted successfully");
        }
        Commands::List { num } => {
            let feeds = aggregator.list_feeds(num.map(i64::from).unwrap_or(0)).await?;
            for feed in feeds {
                println!("Name: {} URL: {}", feed.name, feed.url);
            }
        }
        Commands::Articles { feed_name, num } => {
            let articles = aggregator.get_articles(&feed_name, num.map(i64::from).unwrap_or(0)).await?;
            for article in articles {
                println!("Title: {} Link: {} Published: {}", article.title, article.link, article.published_at);
            }
        }
        Commands::SetInterval { duration } => {
            aggregator.set_interval(duration).await?;
            println!("Interval of fetching feeds changed to {}", humantime::format_duration(duration));
        }
        Commands::SetWorkers { count } => {
            let old_count = aggregator.resize(count).await?;
            println!("Number of workers changed from {old_count} to {count}");
        }
        Commands::Status => {
            let config = aggregator.get_config().await?;
            println!("Running: {}", config.run);
            println!("Worker count: {}", config.worker_count);
            println!(
                "Timer interval: {}",
                humantime::format_duration(config.poll_period())
            );
        }
    }

    Ok(())
}
