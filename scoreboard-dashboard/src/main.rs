mod args;

use args::Args;
use clap::Parser;
use log::info;
use scoreboard_core::feed::{FeedClient, HttpSource, WsFeed};
use scoreboard_core::notice::{NoticeBus, NoticeKind};
use scoreboard_core::view::Page;
use scoreboard_core::{Dashboard, Notifier};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("=== Scoreboard Dashboard Starting ===");

    let args = Args::parse();
    let config = args.dashboard_config()?;
    info!("Using {} and {}", config.base_url, config.feed_url);

    // 1. Notices go to the terminal as they are raised
    let bus = NoticeBus::new();
    let mut notices = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(notice) => {
                    let tag = match notice.kind {
                        NoticeKind::Warn => "WARN",
                        NoticeKind::Error => "ERROR",
                    };
                    println!("[{}] {}", tag, notice.message);
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 2. Feed first, so pushes during start-up wait in the channel
    let (mut feed, feed_task) = WsFeed::new(&config.feed_url, config.reconnect_delay()).spawn();

    // 3. Topology, views and first pull
    let source = HttpSource::new(&config.base_url);
    let notifier: Arc<dyn Notifier> = Arc::new(bus.clone());
    let mut dashboard = Dashboard::start(
        &Page::standard(),
        source.clone(),
        source,
        notifier,
        config.grid_policy,
    )
    .await?;
    println!("{}", dashboard.render_text());

    // 4. Event loop
    loop {
        tokio::select! {
            event = feed.next_event() => {
                let Some(event) = event else { break };
                if !dashboard.handle(event).await.is_empty() {
                    println!("{}", dashboard.render_text());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    feed_task.abort();
    bus.clear();
    Ok(())
}
