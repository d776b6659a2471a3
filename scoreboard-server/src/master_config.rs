//! Master configuration: the teams being scored and the systems/services monitored for each.

use anyhow::{Context, Result};
use scoreboard_core::snapshot::{CellScore, ScoreSnapshot, TeamRow};
use scoreboard_core::topology::{ColumnKey, ServiceConfig, SystemDescriptor, SystemsConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEntry {
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
    /// `display_name`, `ip_offset` and anything else the grader uses.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub systems: Vec<SystemEntry>,
    #[serde(default)]
    pub services: HashMap<String, ServiceEntry>,
}

impl MasterConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Master config not found at {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
    }

    /// Body of `GET /api/systems`. Teams are never exposed.
    pub fn systems_payload(&self) -> Value {
        serde_json::json!({
            "systems": self.systems,
            "services": self.services,
        })
    }

    /// The same systems as the dashboard sees them.
    pub fn systems_config(&self) -> SystemsConfig {
        let systems = self
            .systems
            .iter()
            .map(|s| {
                let services: Vec<&str> = s.services.iter().map(String::as_str).collect();
                SystemDescriptor::new(&s.name, &services)
            })
            .collect();
        let services = self
            .services
            .iter()
            .map(|(name, entry)| {
                let config = match &entry.display_name {
                    Some(display) => ServiceConfig::new(display),
                    None => ServiceConfig::default(),
                };
                (name.clone(), config)
            })
            .collect();
        SystemsConfig::new(systems, services)
    }

    /// Every team x system x service cell as "Not tested" with zero points.
    pub fn initial_scores(&self) -> ScoreSnapshot {
        self.teams.iter().fold(ScoreSnapshot::new(), |snapshot, team| {
            let mut row = TeamRow::new();
            for system in &self.systems {
                for service in &system.services {
                    row.insert(ColumnKey::new(&system.name, service), CellScore::not_tested());
                }
            }
            snapshot.with_team(&team.id, row)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_core::snapshot::ServiceResult;
    use scoreboard_core::topology::Topology;

    const MASTER: &str = r#"{
        "teams": [
            {"id": "team1", "name": "Blue", "password": "hunter2"},
            {"id": "team2", "name": "Red", "password": "swordfish"}
        ],
        "systems": [
            {"name": "ubuntu1", "display_name": "Ubuntu 1", "ip_offset": 20, "services": ["ping", "ssh", "web"]},
            {"name": "ubuntu2", "display_name": "Ubuntu 2", "ip_offset": 30, "services": ["ping", "ssh", "web"]}
        ],
        "services": {
            "ping": {"display_name": "Ping", "points": 5},
            "ssh": {"display_name": "SSH", "points": 10, "default_port": 22},
            "web": {"display_name": "Web", "points": 10, "timeout": 20}
        },
        "grading": {"interval_seconds": 40}
    }"#;

    fn master() -> MasterConfig {
        serde_json::from_str(MASTER).unwrap()
    }

    #[test]
    fn test_initial_scores_cover_every_cell() {
        let scores = master().initial_scores();

        assert_eq!(scores.teams().collect::<Vec<_>>(), vec!["team1", "team2"]);
        let row = scores.row("team2").unwrap();
        assert_eq!(row.len(), 6);
        assert!(row
            .iter()
            .all(|(_, cell)| cell.result() == &ServiceResult::NotTested && cell.score() == 0.0));
    }

    #[test]
    fn test_systems_payload_keeps_metadata_and_hides_teams() {
        let payload = master().systems_payload();

        assert!(payload.get("teams").is_none());
        assert_eq!(payload["systems"][1]["ip_offset"], 30);
        assert_eq!(payload["services"]["ssh"]["default_port"], 22);
        assert!(!payload.to_string().contains("hunter2"));
    }

    #[test]
    fn test_payload_round_trips_into_the_fallback_topology() {
        let payload = master().systems_payload();
        let config: SystemsConfig = serde_json::from_value(payload).unwrap();

        assert_eq!(Topology::from_config(&config).unwrap(), Topology::fallback());
        assert_eq!(master().systems_config(), config);
    }
}
