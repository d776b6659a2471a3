//! # Topology
//!
//! The ordered set of monitored `(system, service)` columns and their display labels.
//!
//! A [`Topology`] is derived in one pass from a [`SystemsConfig`] and never mutated afterwards.
//! Both views key their cells and series on the same [`ColumnKey`]s, so a topology is shared
//! as an `Arc<Topology>` and replaced wholesale when the config is fetched again.

pub mod store;

pub use store::{ConfigSource, TopologyStore};

use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One monitored host. `name` is unique within a topology.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SystemDescriptor {
    name: String,
    #[serde(default)]
    services: Vec<String>,
}

impl SystemDescriptor {
    pub fn new(name: &str, services: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            services: services.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }
}

/// Cosmetic metadata for a service. Unknown fields of the master config are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

impl ServiceConfig {
    pub fn new(display_name: &str) -> Self {
        Self {
            display_name: Some(display_name.to_string()),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Payload of `GET /api/systems`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SystemsConfig {
    #[serde(default)]
    systems: Vec<SystemDescriptor>,
    #[serde(default)]
    services: HashMap<String, ServiceConfig>,
}

impl SystemsConfig {
    pub fn new(systems: Vec<SystemDescriptor>, services: HashMap<String, ServiceConfig>) -> Self {
        Self { systems, services }
    }

    pub fn systems(&self) -> &[SystemDescriptor] {
        &self.systems
    }

    pub fn services(&self) -> &HashMap<String, ServiceConfig> {
        &self.services
    }

    /// The config the fallback topology is derived from: two hosts running ping, ssh and web.
    pub fn fallback() -> Self {
        let systems = vec![
            SystemDescriptor::new("ubuntu1", &["ping", "ssh", "web"]),
            SystemDescriptor::new("ubuntu2", &["ping", "ssh", "web"]),
        ];
        let services = HashMap::from([
            ("ping".to_string(), ServiceConfig::new("Ping")),
            ("ssh".to_string(), ServiceConfig::new("SSH")),
            ("web".to_string(), ServiceConfig::new("Web")),
        ]);
        Self { systems, services }
    }
}

/// Identifier of one grid column / chart series: `system.name ++ service`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ColumnKey(String);

impl ColumnKey {
    pub fn new(system: &str, service: &str) -> Self {
        Self(format!("{}{}", system, service))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered columns plus their labels.
#[derive(Clone, Debug, PartialEq)]
pub struct Topology {
    columns: Vec<ColumnKey>,
    labels: HashMap<ColumnKey, String>,
}

impl Topology {
    /// Derives columns in system-then-service order.
    ///
    /// The whole config is rejected if two `(system, service)` pairs concatenate to the same key;
    /// a topology is either fully built or not built at all.
    pub fn from_config(config: &SystemsConfig) -> Result<Self, TopologyError> {
        let mut columns = Vec::new();
        let mut labels = HashMap::new();

        for system in config.systems() {
            let system_num = system_number(system.name());
            for service in system.services() {
                let key = ColumnKey::new(system.name(), service);
                if labels.contains_key(&key) {
                    return Err(TopologyError::DuplicateColumn(key.0));
                }
                let display = config
                    .services()
                    .get(service)
                    .and_then(ServiceConfig::display_name)
                    .unwrap_or(service);
                labels.insert(key.clone(), format!("{} ({})", display, system_num));
                columns.push(key);
            }
        }

        Ok(Self { columns, labels })
    }

    /// The fixed six-column topology used when the remote config is unavailable.
    pub fn fallback() -> Self {
        // The fallback config has no colliding keys.
        Self::from_config(&SystemsConfig::fallback()).unwrap_or_else(|_| Self {
            columns: Vec::new(),
            labels: HashMap::new(),
        })
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    /// Label for `key`, or the raw key when the column is unknown.
    pub fn label<'a>(&'a self, key: &'a ColumnKey) -> &'a str {
        self.labels
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| key.as_str())
    }

    pub fn labels(&self) -> &HashMap<ColumnKey, String> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Digits of a system name ("ubuntu12" -> "12"), or "?" when it has none.
fn system_number(name: &str) -> String {
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        "?".to_string()
    } else {
        digits
    }
}
