//! # Reconciler
//!
//! Pure derivation of the displayed state of every `(team, column)` cell.
//!
//! Both views call [`reconcile`] on their own, with the same inputs, so they always agree on
//! row order and classification. Only the three-way [`CellClass`] leaves this module; failure
//! reasons stay behind.

use crate::snapshot::{ScoreSnapshot, ServiceResult};
use crate::topology::{ColumnKey, Topology};

/// Display class of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellClass {
    Ok,
    Unknown,
    Fail,
}

impl CellClass {
    pub fn classify(result: Option<&ServiceResult>) -> Self {
        match result {
            Some(ServiceResult::Success) => Self::Ok,
            Some(ServiceResult::NotTested) | None => Self::Unknown,
            Some(ServiceResult::Failure(_)) => Self::Fail,
        }
    }

    /// Class name carried by a grid cell.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unknown => "unknown",
            Self::Fail => "fail",
        }
    }

    /// Text shown in a grid cell.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Unknown => "Not tested",
            Self::Fail => "FAIL",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellState {
    team: String,
    column: ColumnKey,
    class: CellClass,
    score: f64,
}

impl CellState {
    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn column(&self) -> &ColumnKey {
        &self.column
    }

    pub fn class(&self) -> CellClass {
        self.class
    }

    /// Chart points of the cell, zero when untested or missing.
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// A cell that is new or differs from the previous reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct CellChange {
    pub team: String,
    pub column: ColumnKey,
    pub previous: Option<CellClass>,
    pub current: CellClass,
}

/// The classified `teams x columns` grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    teams: Vec<String>,
    columns: Vec<ColumnKey>,
    cells: Vec<CellState>,
}

impl Reconciliation {
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Cells of one team in column order.
    pub fn row(&self, index: usize) -> &[CellState] {
        let width = self.columns.len();
        &self.cells[index * width..(index + 1) * width]
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[CellState])> {
        self.teams
            .iter()
            .enumerate()
            .map(|(i, team)| (team.as_str(), self.row(i)))
    }

    pub fn cell(&self, team: &str, column: &ColumnKey) -> Option<&CellState> {
        let row = self.teams.iter().position(|t| t == team)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.cells.get(row * self.columns.len() + col)
    }

    /// Cells that are new or changed relative to `previous`. With no previous state every cell is new.
    pub fn changes_since(&self, previous: Option<&Reconciliation>) -> Vec<CellChange> {
        self.cells
            .iter()
            .filter_map(|cell| {
                let before = previous.and_then(|p| p.cell(&cell.team, &cell.column));
                let unchanged = before
                    .map(|b| b.class == cell.class && b.score == cell.score)
                    .unwrap_or(false);
                if unchanged {
                    return None;
                }
                Some(CellChange {
                    team: cell.team.clone(),
                    column: cell.column.clone(),
                    previous: before.map(|b| b.class),
                    current: cell.class,
                })
            })
            .collect()
    }
}

/// Classifies every `(team, column)` pair of `teams(snapshot) x topology.columns`.
pub fn reconcile(topology: &Topology, snapshot: &ScoreSnapshot) -> Reconciliation {
    let teams: Vec<String> = snapshot.teams().map(str::to_string).collect();
    let columns = topology.columns().to_vec();

    let mut cells = Vec::with_capacity(teams.len() * columns.len());
    for team in &teams {
        cells.extend(classify_team(topology, snapshot, team));
    }

    Reconciliation {
        teams,
        columns,
        cells,
    }
}

/// One row of cells for `team`. A team absent from the snapshot is all [`CellClass::Unknown`].
pub fn classify_team(topology: &Topology, snapshot: &ScoreSnapshot, team: &str) -> Vec<CellState> {
    topology
        .columns()
        .iter()
        .map(|column| {
            let cell = snapshot.cell(team, column);
            CellState {
                team: team.to_string(),
                column: column.clone(),
                class: CellClass::classify(cell.map(|c| c.result())),
                score: cell.map(|c| c.chart_score()).unwrap_or(0.0),
            }
        })
        .collect()
}
