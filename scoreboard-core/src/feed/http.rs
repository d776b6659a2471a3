use super::SnapshotSource;
use crate::error::FetchError;
use crate::snapshot::ScoreSnapshot;
use crate::topology::{ConfigSource, SystemsConfig};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

pub const SYSTEMS_PATH: &str = "/api/systems";
pub const SCORES_PATH: &str = "/scores.json";

/// Pulls the systems config and the scores snapshot over HTTP.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `Ok(None)` on a non-success status.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            debug!("GET {} -> {}", url, response.status());
            return Ok(None);
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| FetchError::Malformed {
                url,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ConfigSource for HttpSource {
    async fn fetch_systems(&self) -> Result<SystemsConfig, FetchError> {
        let url = format!("{}{}", self.base_url, SYSTEMS_PATH);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Malformed {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch_snapshot(&self) -> Result<Option<ScoreSnapshot>, FetchError> {
        self.get_json(SCORES_PATH).await
    }
}
