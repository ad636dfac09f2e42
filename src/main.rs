use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use feedscout::config::Config;
use feedscout::fetch::Fetcher;
use feedscout::server::{self, AppState};
use feedscout::util::{Clock, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "feedscout", about = "Feed discovery and normalization service")]
struct Args {
    /// Path to a TOML config file (optional; defaults apply without one)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Socket address to bind, overriding the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load config file")?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let fetcher = Arc::new(Fetcher::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = Arc::new(AppState::new(&config, fetcher, clock));
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "Listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
