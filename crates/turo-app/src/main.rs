use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use turo_config::Config;
use turo_core::Session;
use turo_explain::{Explainer, HfClient};
use turo_store::{LearnedFile, load_words};

pub mod controller;
pub mod events;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

/// Terminal flashcard trainer for a bilingual word list
#[derive(Parser)]
#[command(name = "turo")]
struct Args {
    /// Path to the word list JSON document
    #[arg(long)]
    words: Option<PathBuf>,

    /// Directory for persisted progress
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut config = Config::new();
    if let Some(words) = args.words {
        config.words_path = words.display().to_string();
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.display().to_string();
    }

    // No session without a word list; load failures are fatal here.
    let words = load_words(Path::new(&config.words_path))
        .with_context(|| format!("loading word list from {}", config.words_path))?;
    tracing::info!("loaded {} word pairs", words.total_words());

    let backend = LearnedFile::new(Path::new(&config.storage.data_dir), &config.storage.learned_key);
    let session = Session::new(words, Box::new(backend), StdRng::from_os_rng());

    let explainer: Arc<dyn Explainer> = Arc::new(HfClient::new(&config.inference)?);

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(session, explainer);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::info!("task exited"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
        }
    }

    controller.shutdown();
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}
