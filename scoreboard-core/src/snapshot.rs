//! # Score Snapshot
//!
//! The last-known `team -> column -> result` mapping.
//!
//! The wire shape (`scores.json` and the `scores` push event) is
//! `{ "team1": { "ubuntu1ping": { "error": "Success", "score": 10 } } }`.
//! Status strings are translated into [`ServiceResult`] exactly once, while deserializing;
//! nothing downstream looks at the raw strings again.

use crate::topology::ColumnKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const SUCCESS: &str = "Success";
const NOT_TESTED: &str = "Not tested";

/// Outcome of the last check of one service.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceResult {
    Success,
    NotTested,
    /// Any other status. The reason is kept for logs but never rendered.
    Failure(String),
}

impl ServiceResult {
    /// Maps the wire `error` field. A cell that exists but carries no status is a failure.
    pub fn from_wire(error: Option<&Value>) -> Self {
        match error {
            Some(Value::String(s)) if s == SUCCESS => Self::Success,
            Some(Value::String(s)) if s == NOT_TESTED => Self::NotTested,
            Some(Value::String(s)) => Self::Failure(s.clone()),
            Some(Value::Null) | None => Self::Failure("missing status".to_string()),
            Some(other) => Self::Failure(other.to_string()),
        }
    }

    fn to_wire(&self) -> String {
        match self {
            Self::Success => SUCCESS.to_string(),
            Self::NotTested => NOT_TESTED.to_string(),
            Self::Failure(reason) => reason.clone(),
        }
    }
}

#[derive(Deserialize)]
struct WireCellIn {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    score: Option<Value>,
}

#[derive(Serialize)]
struct WireCellOut {
    error: String,
    score: Value,
}

/// Whole points go back out as integers, the way the grader writes them.
fn wire_score(score: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if score.fract() == 0.0 && score.abs() <= MAX_EXACT {
        Value::from(score as i64)
    } else {
        serde_json::Number::from_f64(score)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

/// Result plus the accumulated points of one `(team, column)` cell.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "WireCellIn", into = "WireCellOut")]
pub struct CellScore {
    result: ServiceResult,
    score: f64,
}

impl From<WireCellIn> for CellScore {
    fn from(wire: WireCellIn) -> Self {
        let score = wire.score.as_ref().and_then(Value::as_f64).unwrap_or(0.0);
        Self {
            result: ServiceResult::from_wire(wire.error.as_ref()),
            score,
        }
    }
}

impl From<CellScore> for WireCellOut {
    fn from(cell: CellScore) -> Self {
        Self {
            error: cell.result.to_wire(),
            score: wire_score(cell.score),
        }
    }
}

impl CellScore {
    pub fn new(result: ServiceResult, score: f64) -> Self {
        Self { result, score }
    }

    pub fn not_tested() -> Self {
        Self::new(ServiceResult::NotTested, 0.0)
    }

    pub fn result(&self) -> &ServiceResult {
        &self.result
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Points contributed to the chart. Untested cells count as zero.
    pub fn chart_score(&self) -> f64 {
        match self.result {
            ServiceResult::NotTested => 0.0,
            _ => self.score,
        }
    }
}

/// Every known cell of one team. Absent keys read as not tested.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct TeamRow {
    cells: BTreeMap<ColumnKey, CellScore>,
}

impl TeamRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, cell: CellScore) -> Self {
        self.insert(ColumnKey::from(key), cell);
        self
    }

    pub fn insert(&mut self, key: ColumnKey, cell: CellScore) {
        self.cells.insert(key, cell);
    }

    pub fn get(&self, key: &ColumnKey) -> Option<&CellScore> {
        self.cells.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, &CellScore)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// `team -> TeamRow`. Teams iterate in lexicographic order, which is the row order of every view.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ScoreSnapshot {
    teams: BTreeMap<String, TeamRow>,
}

impl ScoreSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, team: &str, row: TeamRow) -> Self {
        self.teams.insert(team.to_string(), row);
        self
    }

    /// Sorted team names.
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }

    pub fn row(&self, team: &str) -> Option<&TeamRow> {
        self.teams.get(team)
    }

    pub fn cell(&self, team: &str, key: &ColumnKey) -> Option<&CellScore> {
        self.teams.get(team).and_then(|row| row.get(key))
    }

    pub fn contains_team(&self, team: &str) -> bool {
        self.teams.contains_key(team)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Swaps in `other` wholesale.
    pub fn replace(&mut self, other: ScoreSnapshot) {
        self.teams = other.teams;
    }

    /// Overwrites every cell present in `other`, adding teams as needed. Nothing is removed.
    ///
    /// Returns the number of cells whose value changed.
    pub fn merge(&mut self, other: ScoreSnapshot) -> usize {
        let mut changed = 0;
        for (team, incoming) in other.teams {
            let row = self.teams.entry(team).or_default();
            for (key, cell) in incoming.cells {
                if row.cells.get(&key) != Some(&cell) {
                    row.cells.insert(key, cell);
                    changed += 1;
                }
            }
        }
        changed
    }
}
