//! # Dashboard
//!
//! Owns the snapshot and the published topology, and drives both views from feed events.
//!
//! Start-up order is fixed: topology first (remote or fallback), then the views, then a pull of
//! `/scores.json`. Feed events are only read after [`Dashboard::start`] returns, so anything pushed
//! while the topology was loading waits in the feed and is applied against the final topology.
//!
//! Nothing in here is fatal once started: fetch failures are logged, render failures become
//! error notices, a dropped feed becomes a warning notice, and the last rendered state stays.

use crate::error::RenderError;
use crate::feed::{FeedClient, FeedEvent, SnapshotSource};
use crate::notice::Notifier;
use crate::reconciler::{reconcile, CellChange, Reconciliation};
use crate::snapshot::ScoreSnapshot;
use crate::topology::{ConfigSource, Topology, TopologyStore};
use crate::view::{ChartView, GridUpdatePolicy, GridView, Page, View};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub const GRID_FAILURE: &str = "Failed to update leaderboard table from scores.";
pub const CHART_FAILURE: &str = "Failed to update leaderboard chart from scores.";
pub const DISCONNECT_WARNING: &str = "Disconnected from live updates. Attempting to reconnect...";

pub struct Dashboard<C, P> {
    store: TopologyStore<C>,
    snapshots: P,
    topology: Arc<Topology>,
    snapshot: ScoreSnapshot,
    last: Option<Reconciliation>,
    grid: GridView,
    chart: ChartView,
    notifier: Arc<dyn Notifier>,
}

impl<C, P> Dashboard<C, P>
where
    C: ConfigSource,
    P: SnapshotSource,
{
    /// Loads the topology, mounts both views and applies the first pulled snapshot.
    ///
    /// Fails only when the chart canvas is missing from `page`.
    pub async fn start(
        page: &Page,
        config_source: C,
        snapshots: P,
        notifier: Arc<dyn Notifier>,
        grid_policy: GridUpdatePolicy,
    ) -> Result<Self, RenderError> {
        let mut store = TopologyStore::new(config_source);
        let topology = store.load().await;

        let grid = GridView::attach(page, grid_policy);
        let chart = ChartView::init(page, &topology)?;
        info!(
            "Dashboard started with {} columns (grid policy {:?})",
            topology.len(),
            grid_policy
        );

        let mut dashboard = Self {
            store,
            snapshots,
            topology,
            snapshot: ScoreSnapshot::new(),
            last: None,
            grid,
            chart,
            notifier,
        };
        dashboard.pull_snapshot().await;
        Ok(dashboard)
    }

    /// Handles events until the feed closes.
    pub async fn run<F: FeedClient>(&mut self, feed: &mut F) {
        while let Some(event) = feed.next_event().await {
            self.handle(event).await;
        }
        info!("Feed closed, dashboard stopped");
    }

    /// Returns the cells that changed because of `event`.
    pub async fn handle(&mut self, event: FeedEvent) -> Vec<CellChange> {
        debug!("Feed event: {}", event.name());
        match event {
            FeedEvent::Scores(update) => {
                self.snapshot.merge(update);
                self.apply()
            }
            FeedEvent::Connect => {
                info!("Connected to scoreboard feed");
                self.pull_snapshot().await
            }
            FeedEvent::Disconnect => {
                self.notifier.warn(DISCONNECT_WARNING);
                Vec::new()
            }
        }
    }

    /// Fetches the topology again and rebuilds both views against the current snapshot.
    pub async fn refresh_topology(&mut self) {
        self.topology = self.store.load().await;

        if let Err(e) = self.grid.build(&self.topology, &self.snapshot) {
            error!("Grid rebuild failed: {}", e);
            self.notifier.error(GRID_FAILURE);
        }
        if let Err(e) = self.chart.build(&self.topology, &self.snapshot) {
            error!("Chart rebuild failed: {}", e);
            self.notifier.error(CHART_FAILURE);
        }
        self.last = Some(reconcile(&self.topology, &self.snapshot));
    }

    /// One-shot `/scores.json`. A successful pull replaces the snapshot; anything else is skipped.
    async fn pull_snapshot(&mut self) -> Vec<CellChange> {
        match self.snapshots.fetch_snapshot().await {
            Ok(Some(snapshot)) => {
                self.snapshot.replace(snapshot);
                self.apply()
            }
            Ok(None) => {
                debug!("No snapshot available, waiting for the feed");
                Vec::new()
            }
            Err(e) => {
                warn!("Snapshot fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Diffs against the previous reconciliation and pushes the snapshot into both views.
    fn apply(&mut self) -> Vec<CellChange> {
        let rec = reconcile(&self.topology, &self.snapshot);
        let changes = rec.changes_since(self.last.as_ref());
        debug!(
            "Reconciled {} teams, {} cells changed",
            rec.teams().len(),
            changes.len()
        );
        self.last = Some(rec);

        if let Err(e) = self.grid.update(&self.topology, &self.snapshot) {
            error!("Error updating table from scores: {}", e);
            self.notifier.error(GRID_FAILURE);
        }
        if let Err(e) = self.chart.update(&self.topology, &self.snapshot) {
            error!("Error updating chart from scores: {}", e);
            self.notifier.error(CHART_FAILURE);
        }
        changes
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn snapshot(&self) -> &ScoreSnapshot {
        &self.snapshot
    }

    pub fn grid(&self) -> &GridView {
        &self.grid
    }

    pub fn chart(&self) -> &ChartView {
        &self.chart
    }

    /// Grid followed by chart, as plain text.
    pub fn render_text(&self) -> String {
        format!("{}\n\n{}", self.grid.render_text(), self.chart.render_text())
    }
}
