use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tweetpanel::{
    CacheGateway, FileStore, HttpTransport, Reconciler, RefreshScheduler, TextSurface,
    TweetsConfig,
};

#[derive(Parser)]
#[command(name = "tweetpanel", about = "Poll a tweets feed and print its rendered markup")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Feed endpoint URL; overrides the config file.
    #[arg(long)]
    url: Option<String>,

    /// Per-request item count; overrides the config file.
    #[arg(long)]
    limit: Option<usize>,

    /// Seconds between refresh cycles; overrides the config file.
    #[arg(long)]
    interval: Option<u64>,

    /// Maximum automatic refresh cycles before pausing.
    #[arg(long)]
    max_refreshes: Option<u32>,
}

fn cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tweetpanel")
        .join("cache.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TweetsConfig::load(path)?,
        None => TweetsConfig::default(),
    };
    if let Some(url) = cli.url {
        config.request_url = url;
    }
    if let Some(limit) = cli.limit {
        config.limit = Some(limit);
    }
    if let Some(interval) = cli.interval {
        config.refresh_interval_secs = interval;
    }
    if let Some(max) = cli.max_refreshes {
        config.attempt_limit = Some(max);
    }

    let mut scheduler = RefreshScheduler::new(
        config,
        Box::new(HttpTransport::new()),
        CacheGateway::new(Box::new(FileStore::new(cache_path()))),
        Reconciler::new(Box::new(TextSurface::new(true))),
    );

    scheduler.run().await;
    Ok(())
}
