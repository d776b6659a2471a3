//! # Views
//!
//! Two projections of the same reconciliation:
//! - [`GridView`]: a status table patched cell by cell.
//! - [`ChartView`]: a stacked bar chart whose datasets are replaced on every update.
//!
//! Views never talk to the feed. The dashboard hands them a topology and a snapshot, and
//! whatever they render comes from [`crate::reconciler::reconcile`].

pub mod chart;
pub mod grid;

pub use chart::{ChartView, Series, PALETTE};
pub use grid::{GridCell, GridOutcome, GridRow, GridTable, GridUpdatePolicy, GridView};

use crate::error::RenderError;
use crate::snapshot::ScoreSnapshot;
use crate::topology::Topology;
use std::collections::HashSet;

/// Mount point id of the status grid.
pub const TABLE_CONTAINER: &str = "tableContainer";
/// Mount point id of the chart canvas.
pub const CHART_CANVAS: &str = "leaderboardChart";

/// Something that renders a snapshot against a topology.
pub trait View {
    /// Renders from scratch.
    fn build(&mut self, topology: &Topology, snapshot: &ScoreSnapshot) -> Result<(), RenderError>;

    /// Brings the rendered state in line with `snapshot`.
    fn update(&mut self, topology: &Topology, snapshot: &ScoreSnapshot)
        -> Result<(), RenderError>;
}

/// The mount points a page offers to views.
#[derive(Clone, Debug, Default)]
pub struct Page {
    mounts: HashSet<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page with both the table container and the chart canvas.
    pub fn standard() -> Self {
        Self::new().with_mount(TABLE_CONTAINER).with_mount(CHART_CANVAS)
    }

    pub fn with_mount(mut self, id: &str) -> Self {
        self.mounts.insert(id.to_string());
        self
    }

    pub fn has_mount(&self, id: &str) -> bool {
        self.mounts.contains(id)
    }
}
