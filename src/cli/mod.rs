//! Command-line grammar for the `rsshub` executable.

use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rsshub", version, about = "Polls RSS feeds into a shared article store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Starts the background polling engine; blocks until shutdown.
    Fetch,
    /// Registers a new feed.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        desc: String,
    },
    /// Removes a feed and its articles.
    Delete {
        #[arg(long)]
        name: String,
    },
    /// Lists registered feeds.
    List {
        #[arg(long)]
        num: Option<u32>,
    },
    /// Lists articles collected for a feed.
    Articles {
        #[arg(long = "feed-name")]
        feed_name: String,
        #[arg(long)]
        num: Option<u32>,
    },
    /// Changes the polling interval.
    SetInterval {
        #[arg(value_parser = parse_duration)]
        duration: Duration,
    },
    /// Changes the live worker count.
    SetWorkers {
        #[arg(value_parser = clap::value_parser!(i32).range(1..=10_000))]
        count: i32,
    },
    /// Prints the current engine configuration.
    Status,
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    humantime::parse_duration(raw).map_err(|err| err.to_string())
}
