//! The scores file and the task that turns its changes into push frames.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use scoreboard_core::feed::FeedEvent;
use scoreboard_core::snapshot::ScoreSnapshot;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;

/// `scores.json` on disk. Another process (the grader) owns the writes.
#[derive(Debug, Clone)]
pub struct ScoreFile {
    path: PathBuf,
}

impl ScoreFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ScoreSnapshot> {
        let raw = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("Invalid scores in {}", self.path.display()))
    }

    /// Writes through a temp file and a rename so readers never see a half-written file.
    pub fn save(&self, snapshot: &ScoreSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create parent directory")?;
            }
        }

        let json = serde_json::to_vec(snapshot).context("Failed to serialize scores")?;
        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file =
            std::fs::File::create(&temp_path).context("Failed to create temp file")?;
        temp_file
            .write_all(&json)
            .context("Failed to write temp file")?;
        temp_file.sync_all().context("Failed to sync temp file")?;

        std::fs::rename(&temp_path, &self.path).context("Failed to replace scores file")?;
        Ok(())
    }

    /// A `scores` frame with the current contents.
    pub fn frame(&self) -> Result<String> {
        let frame = serde_json::to_string(&FeedEvent::Scores(self.load()?))?;
        Ok(frame)
    }
}

/// Polls the scores file and broadcasts a `scores` frame whenever its contents change.
///
/// Unreadable or half-written files are skipped until the next tick.
pub async fn watch(file: ScoreFile, interval: Duration, tx: broadcast::Sender<String>) {
    info!("Watching {} every {:?}", file.path().display(), interval);
    let mut last: Option<ScoreSnapshot> = None;
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        let snapshot = match file.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Scores not readable yet: {:#}", e);
                continue;
            }
        };
        if last.as_ref() == Some(&snapshot) {
            continue;
        }

        match serde_json::to_string(&FeedEvent::Scores(snapshot.clone())) {
            Ok(frame) => {
                // Nobody listening is fine.
                let receivers = tx.send(frame).unwrap_or(0);
                debug!("Scores changed, pushed to {} clients", receivers);
            }
            Err(e) => warn!("Failed to encode scores frame: {}", e),
        }
        last = Some(snapshot);
    }
}
