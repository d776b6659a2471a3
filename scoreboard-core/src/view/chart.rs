use super::{Page, View, CHART_CANVAS};
use crate::error::RenderError;
use crate::reconciler::reconcile;
use crate::snapshot::ScoreSnapshot;
use crate::topology::{ColumnKey, Topology};

/// Series colours, assigned cyclically in column order.
pub const PALETTE: [&str; 6] = [
    "#4dc9f6", "#f67019", "#f53794", "#537bc4", "#acc236", "#166a8f",
];

/// One stacked dataset: the points of every team for a single column.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    key: ColumnKey,
    label: String,
    color: &'static str,
    data: Vec<f64>,
}

impl Series {
    pub fn key(&self) -> &ColumnKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    /// One value per team, aligned with [`ChartView::labels`].
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Stacked bar chart bound to the `leaderboardChart` canvas.
///
/// Every update replaces the team labels and all series data in one pass.
#[derive(Debug)]
pub struct ChartView {
    labels: Vec<String>,
    series: Vec<Series>,
    redraws: u64,
}

impl ChartView {
    /// Creates one empty series per column. The canvas must exist.
    pub fn init(page: &Page, topology: &Topology) -> Result<Self, RenderError> {
        if !page.has_mount(CHART_CANVAS) {
            return Err(RenderError::MissingMount(CHART_CANVAS.to_string()));
        }
        Ok(Self {
            labels: Vec::new(),
            series: make_series(topology),
            redraws: 0,
        })
    }

    /// Team names on the x axis.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_for(&self, key: &ColumnKey) -> Option<&Series> {
        self.series.iter().find(|s| &s.key == key)
    }

    /// Number of completed updates.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Stacked total of one team.
    pub fn total(&self, team: &str) -> f64 {
        match self.labels.iter().position(|t| t == team) {
            Some(i) => self.series.iter().map(|s| s.data[i]).sum(),
            None => 0.0,
        }
    }

    /// Plain-text rendering: one bar per team, then the legend.
    pub fn render_text(&self) -> String {
        let width = self.labels.iter().map(String::len).max().unwrap_or(0);
        let mut out: Vec<String> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, team)| {
                let segments: Vec<String> = self
                    .series
                    .iter()
                    .filter(|s| s.data[i] > 0.0)
                    .map(|s| format!("{}={}", s.label, s.data[i]))
                    .collect();
                format!(
                    "{:<width$} {:>6} {}",
                    team,
                    self.total(team),
                    segments.join(" "),
                    width = width
                )
            })
            .collect();

        let legend: Vec<String> = self
            .series
            .iter()
            .map(|s| format!("{} {}", s.color, s.label))
            .collect();
        out.push(legend.join(", "));
        out.join("\n")
    }
}

fn make_series(topology: &Topology) -> Vec<Series> {
    topology
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, key)| Series {
            key: key.clone(),
            label: topology.label(key).to_string(),
            color: PALETTE[idx % PALETTE.len()],
            data: Vec::new(),
        })
        .collect()
}

impl View for ChartView {
    /// Re-creates the series from `topology`, then fills them.
    fn build(&mut self, topology: &Topology, snapshot: &ScoreSnapshot) -> Result<(), RenderError> {
        self.series = make_series(topology);
        self.update(topology, snapshot)
    }

    fn update(
        &mut self,
        topology: &Topology,
        snapshot: &ScoreSnapshot,
    ) -> Result<(), RenderError> {
        let matches = self.series.len() == topology.len()
            && self
                .series
                .iter()
                .zip(topology.columns())
                .all(|(s, k)| &s.key == k);
        if !matches {
            return Err(RenderError::TopologyMismatch {
                view: self.series.len(),
                topology: topology.len(),
            });
        }

        let rec = reconcile(topology, snapshot);
        let mut data: Vec<Vec<f64>> = vec![Vec::with_capacity(rec.teams().len()); self.series.len()];
        for (_, row) in rec.rows() {
            for (idx, cell) in row.iter().enumerate() {
                data[idx].push(cell.score());
            }
        }

        self.labels = rec.teams().to_vec();
        for (series, values) in self.series.iter_mut().zip(data) {
            series.data = values;
        }
        self.redraws += 1;
        Ok(())
    }
}
