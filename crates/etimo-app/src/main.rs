use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use etimo_config::Config;
use etimo_core::{FileStore, HistoryStore, KeyValueStore, MemoryStore, SearchController};
use etimo_lookup::GeminiLookup;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod controller;
pub mod events;
pub mod io;
pub mod ui;


use self::controller::AppController;

/// Look up the real origin of words
#[derive(Parser)]
#[command(name = "etimo", version)]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Word looked up at startup
    #[arg(long)]
    seed: Option<String>,

    /// Skip the startup lookup
    #[arg(long, conflicts_with = "seed")]
    no_seed: bool,

    /// Where search history is kept
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json_logs);

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new(),
    };
    if let Some(dir) = args.data_dir {
        config.history.data_dir = Some(dir);
    }
    if let Some(seed) = args.seed {
        config.seed_word = seed;
    }
    if args.no_seed {
        config.seed_word.clear();
    }

    if config.lookup.api_key.is_empty() {
        tracing::warn!("API_KEY is not set, every lookup will fail");
    }

    let storage: Box<dyn KeyValueStore> = match config.history.resolve_data_dir() {
        Some(dir) => {
            tracing::info!("History stored in {}", dir.display());
            Box::new(FileStore::new(dir))
        }
        None => {
            tracing::warn!("No data directory available, history will not survive a restart");
            Box::new(MemoryStore::new())
        }
    };
    let history = HistoryStore::load(storage, config.history.storage_key.clone());
    let search = SearchController::new(history);

    let lookup = Arc::new(GeminiLookup::new(&config.lookup)?);
    let seed_word = Some(config.seed_word.clone()).filter(|w| !w.trim().is_empty());

    let app = AppController::new();
    let mut tasks = app.spawn_tasks(
        search,
        lookup,
        seed_word,
        BufReader::new(std::io::stdin()),
        std::io::stdout(),
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::debug!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    app.shutdown();
    // Let the UI draw its last frame
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::error!("task failed during shutdown: {e}");
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    // stdout is the view, keep the default quiet
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
