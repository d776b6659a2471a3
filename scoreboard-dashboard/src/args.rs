use clap::Parser;
use scoreboard_core::view::GridUpdatePolicy;
use scoreboard_core::DashboardConfig;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file with dashboard settings; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Origin serving /api/systems and /scores.json
    #[arg(long)]
    pub base_url: Option<String>,

    /// WebSocket push feed
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Delay between reconnection attempts, in milliseconds
    #[arg(long)]
    pub reconnect_ms: Option<u64>,

    /// Rebuild the grid when the feed brings teams it has no row for
    #[arg(long)]
    pub rebuild_on_new_teams: bool,
}

impl Args {
    pub fn dashboard_config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(url) = &self.feed_url {
            config.feed_url = url.clone();
        }
        if let Some(ms) = self.reconnect_ms {
            config.reconnect_delay_ms = ms;
        }
        if self.rebuild_on_new_teams {
            config.grid_policy = GridUpdatePolicy::RebuildOnNewTeams;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "scoreboard-dashboard",
            "--base-url",
            "http://scores:8080",
            "--reconnect-ms",
            "500",
            "--rebuild-on-new-teams",
        ]);
        let config = args.dashboard_config().unwrap();

        assert_eq!(config.base_url, "http://scores:8080");
        assert_eq!(config.feed_url, "ws://127.0.0.1:5000/ws");
        assert_eq!(config.reconnect_delay_ms, 500);
        assert_eq!(config.grid_policy, GridUpdatePolicy::RebuildOnNewTeams);
    }

    #[test]
    fn test_no_flags_is_default_config() {
        let args = Args::parse_from(["scoreboard-dashboard"]);
        assert_eq!(args.dashboard_config().unwrap(), DashboardConfig::default());
    }
}
