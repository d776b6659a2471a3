use super::{Page, View, TABLE_CONTAINER};
use crate::error::RenderError;
use crate::reconciler::{reconcile, CellClass, Reconciliation};
use crate::snapshot::ScoreSnapshot;
use crate::topology::{ColumnKey, Topology};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const CAPTION: &str = "Teams vs Systems - green = success";

/// What an update does with teams that have no row yet.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GridUpdatePolicy {
    /// Patch existing cells only. Rows for new teams appear on the next full build.
    #[default]
    InPlace,
    /// Rebuild the table when the snapshot holds a team without a row.
    RebuildOnNewTeams,
}

/// One body cell, tagged with its `(team, column)` identity.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    team: String,
    column: ColumnKey,
    class: CellClass,
}

impl GridCell {
    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn column(&self) -> &ColumnKey {
        &self.column
    }

    pub fn class(&self) -> CellClass {
        self.class
    }

    pub fn text(&self) -> &'static str {
        self.class.text()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridRow {
    team: String,
    cells: Vec<GridCell>,
}

impl GridRow {
    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }
}

/// The rendered table: caption, header labels and one row per team.
#[derive(Clone, Debug, PartialEq)]
pub struct GridTable {
    caption: String,
    header: Vec<String>,
    rows: Vec<GridRow>,
    index: HashMap<(String, ColumnKey), (usize, usize)>,
}

impl GridTable {
    fn build(topology: &Topology, rec: &Reconciliation) -> Self {
        let mut header = vec!["Team".to_string()];
        header.extend(topology.columns().iter().map(|k| topology.label(k).to_string()));

        let mut rows = Vec::with_capacity(rec.teams().len());
        let mut index = HashMap::new();
        for (r, (team, states)) in rec.rows().enumerate() {
            let cells = states
                .iter()
                .enumerate()
                .map(|(c, state)| {
                    index.insert((team.to_string(), state.column().clone()), (r, c));
                    GridCell {
                        team: team.to_string(),
                        column: state.column().clone(),
                        class: state.class(),
                    }
                })
                .collect();
            rows.push(GridRow {
                team: team.to_string(),
                cells,
            });
        }

        Self {
            caption: CAPTION.to_string(),
            header,
            rows,
            index,
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// `Team` followed by one label per column.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.team.as_str())
    }

    /// Looks a cell up by its tag.
    pub fn cell(&self, team: &str, column: &ColumnKey) -> Option<&GridCell> {
        let (r, c) = self.index.get(&(team.to_string(), column.clone()))?;
        self.rows.get(*r)?.cells.get(*c)
    }

    fn cell_mut(&mut self, team: &str, column: &ColumnKey) -> Option<&mut GridCell> {
        let (r, c) = *self.index.get(&(team.to_string(), column.clone()))?;
        self.rows.get_mut(r)?.cells.get_mut(c)
    }

    fn has_team(&self, team: &str) -> bool {
        self.rows.iter().any(|r| r.team == team)
    }
}

/// Result of one grid render call.
#[derive(Clone, Debug, PartialEq)]
pub enum GridOutcome {
    /// No container on the page.
    Skipped,
    Built,
    /// Existing cells were rewritten; `missing_teams` had no row and were left out.
    Patched {
        changed: usize,
        missing_teams: Vec<String>,
    },
}

/// Status table bound to the `tableContainer` mount point.
pub struct GridView {
    mounted: bool,
    table: Option<GridTable>,
    policy: GridUpdatePolicy,
}

impl GridView {
    /// Binds to the page. Without a `tableContainer` the view renders nothing.
    pub fn attach(page: &Page, policy: GridUpdatePolicy) -> Self {
        Self {
            mounted: page.has_mount(TABLE_CONTAINER),
            table: None,
            policy,
        }
    }

    pub fn table(&self) -> Option<&GridTable> {
        self.table.as_ref()
    }

    pub fn policy(&self) -> GridUpdatePolicy {
        self.policy
    }

    /// Builds if nothing is built yet, otherwise patches the tagged cells in place.
    pub fn render(&mut self, topology: &Topology, snapshot: &ScoreSnapshot) -> GridOutcome {
        if !self.mounted {
            return GridOutcome::Skipped;
        }
        let rec = reconcile(topology, snapshot);

        if self.table.is_none() {
            self.table = Some(GridTable::build(topology, &rec));
            return GridOutcome::Built;
        }

        let missing_teams: Vec<String> = match self.table.as_ref() {
            Some(table) => rec
                .teams()
                .iter()
                .filter(|team| !table.has_team(team))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        if !missing_teams.is_empty() && self.policy == GridUpdatePolicy::RebuildOnNewTeams {
            debug!("Grid: rebuilding for new teams {:?}", missing_teams);
            self.table = Some(GridTable::build(topology, &rec));
            return GridOutcome::Built;
        }

        let Some(table) = self.table.as_mut() else {
            return GridOutcome::Skipped;
        };
        let mut changed = 0;
        for state in rec.cells() {
            if let Some(cell) = table.cell_mut(state.team(), state.column()) {
                if cell.class != state.class() {
                    cell.class = state.class();
                    changed += 1;
                }
            }
        }
        if !missing_teams.is_empty() {
            debug!("Grid: no rows for {:?}, left for the next build", missing_teams);
        }

        GridOutcome::Patched {
            changed,
            missing_teams,
        }
    }

    /// Plain-text rendering of the table, one line per row.
    pub fn render_text(&self) -> String {
        let Some(table) = self.table.as_ref() else {
            return String::new();
        };

        let mut widths: Vec<usize> = table.header.iter().map(String::len).collect();
        for row in &table.rows {
            widths[0] = widths[0].max(row.team.len());
            for (i, cell) in row.cells.iter().enumerate() {
                widths[i + 1] = widths[i + 1].max(cell.text().len());
            }
        }

        let line = |values: Vec<&str>| {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let mut out = vec![table.caption.clone()];
        out.push(line(table.header.iter().map(String::as_str).collect()));
        for row in &table.rows {
            let mut values = vec![row.team.as_str()];
            for cell in &row.cells {
                values.push(cell.text());
            }
            out.push(line(values));
        }
        out.join("\n")
    }
}

impl View for GridView {
    fn build(&mut self, topology: &Topology, snapshot: &ScoreSnapshot) -> Result<(), RenderError> {
        if self.mounted {
            self.table = Some(GridTable::build(topology, &reconcile(topology, snapshot)));
        }
        Ok(())
    }

    fn update(
        &mut self,
        topology: &Topology,
        snapshot: &ScoreSnapshot,
    ) -> Result<(), RenderError> {
        self.render(topology, snapshot);
        Ok(())
    }
}
