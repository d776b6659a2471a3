use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to serve the dashboard API and push feed on
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Master config listing teams, systems and services
    #[arg(long, default_value = "master_config.json")]
    pub config: PathBuf,

    /// Scores file written by the grader
    #[arg(long, default_value = "scores.json")]
    pub scores: PathBuf,

    /// How often the scores file is checked for changes, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_ms: u64,

    /// Overwrite the scores file with "Not tested" for every team before serving
    #[arg(long)]
    pub reset_scores: bool,
}
