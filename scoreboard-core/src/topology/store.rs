use super::{SystemsConfig, Topology};
use crate::error::FetchError;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

/// Where the systems config comes from (`GET /api/systems` in production).
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch_systems(&self) -> Result<SystemsConfig, FetchError>;
}

/// Holds the topology currently published to the views.
///
/// [`TopologyStore::load`] never fails: a config that cannot be fetched or derived keeps the
/// last-good topology, or the fallback if nothing was ever loaded.
pub struct TopologyStore<S> {
    source: S,
    current: Option<Arc<Topology>>,
}

impl<S: ConfigSource> TopologyStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: None,
        }
    }

    /// Fetches the config once and derives a fresh topology from it.
    ///
    /// The new topology is published only after it has been fully derived.
    pub async fn load(&mut self) -> Arc<Topology> {
        let derived = match self.source.fetch_systems().await {
            Ok(config) => Topology::from_config(&config).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match derived {
            Ok(topology) => {
                info!("Topology loaded: {} columns", topology.len());
                let topology = Arc::new(topology);
                self.current = Some(topology.clone());
                topology
            }
            Err(reason) => match &self.current {
                Some(last_good) => {
                    warn!("Failed to load systems config ({}), keeping last topology", reason);
                    last_good.clone()
                }
                None => {
                    warn!("Failed to load systems config ({}), using fallback topology", reason);
                    let fallback = Arc::new(Topology::fallback());
                    self.current = Some(fallback.clone());
                    fallback
                }
            },
        }
    }

    /// The last published topology, if `load` ran at least once.
    pub fn current(&self) -> Option<Arc<Topology>> {
        self.current.clone()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
