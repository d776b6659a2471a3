use thiserror::Error;

/// Failure while pulling a remote document (systems config or scores).
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON document we expected.
    #[error("Malformed payload from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// A systems config that cannot be turned into a topology.
#[derive(Error, Debug, PartialEq)]
pub enum TopologyError {
    #[error("Duplicate column key {0}")]
    DuplicateColumn(String),
}

/// Failure while reconciling or painting a view.
#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    /// The mount point a view needs is not on the page.
    #[error("Mount point '{0}' not found")]
    MissingMount(String),

    /// The view was built against another set of columns.
    #[error("View has {view} series but topology has {topology} columns")]
    TopologyMismatch { view: usize, topology: usize },
}

/// Push feed transport failure.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid feed frame: {0}")]
    Frame(#[from] serde_json::Error),
}
