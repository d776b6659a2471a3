//! # Scoreboard Core
//!
//! Keeps a live status grid and a stacked score chart in sync with a stream of per-team,
//! per-service results.
//!
//! ## Modules
//! - `topology`: Column keys and labels derived from the systems config, with a fallback.
//! - `snapshot`: The last-known team -> column -> result mapping and its merge rules.
//! - `reconciler`: Pure classification of every (team, column) cell.
//! - `view`: The grid (patched in place) and the chart (replaced wholesale).
//! - `notice`: Injected, auto-expiring user notices.
//! - `feed`: Push feed and one-shot pulls over HTTP and WebSocket.
//! - `dashboard`: Sequences loading, feed events and re-renders.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod notice;
pub mod reconciler;
pub mod snapshot;
pub mod topology;
pub mod view;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::{FeedError, FetchError, RenderError, TopologyError};
pub use notice::{NoticeBus, Notifier};
pub use reconciler::{reconcile, CellClass, Reconciliation};
pub use snapshot::{CellScore, ScoreSnapshot, ServiceResult, TeamRow};
pub use topology::{ColumnKey, Topology, TopologyStore};
