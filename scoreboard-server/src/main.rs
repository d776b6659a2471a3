mod api;
mod args;
mod master_config;
mod scores;

use anyhow::Context;
use api::AppState;
use args::Args;
use clap::Parser;
use log::{info, warn};
use master_config::MasterConfig;
use scoreboard_core::Topology;
use scores::ScoreFile;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("=== Scoreboard Server Starting ===");

    let args = Args::parse();

    // 1. Master config
    let config = MasterConfig::load(&args.config)?;
    let topology = Topology::from_config(&config.systems_config())
        .with_context(|| format!("Unusable systems in {}", args.config.display()))?;
    info!(
        "Loaded {} teams and {} columns from {}",
        config.teams.len(),
        topology.len(),
        args.config.display()
    );

    // 2. Scores file
    let scores = ScoreFile::new(args.scores.clone());
    if args.reset_scores {
        scores.save(&config.initial_scores())?;
        info!("Reset {} to \"Not tested\"", scores.path().display());
    } else if let Err(e) = scores.load() {
        warn!("Scores not available yet: {:#}", e);
    }

    // 3. Watcher feeding the push channel
    let (tx, _rx) = broadcast::channel(100);
    tokio::spawn(scores::watch(
        scores.clone(),
        Duration::from_millis(args.poll_ms.max(1)),
        tx.clone(),
    ));

    // 4. API
    let state = AppState {
        config: Arc::new(config),
        scores,
        tx,
    };
    api::run_api_server(state, args.port).await
}
