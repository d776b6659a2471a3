use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use scoreboard_core::error::FetchError;
use scoreboard_core::feed::{HttpSource, SnapshotSource};
use scoreboard_core::topology::{ConfigSource, Topology, TopologyStore};
use std::net::SocketAddr;

const SYSTEMS: &str = r#"{
    "systems": [{"name": "sys1", "services": ["ping", "web"], "ip_offset": 20}],
    "services": {"ping": {"display_name": "Ping"}, "web": {"display_name": "Web", "points": 10}}
}"#;

const SCORES: &str = r#"{"teamA": {"sys1ping": {"error": "Success", "score": 10}}}"#;

// Serves `app` on an ephemeral loopback port.
async fn serve(app: Router) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

fn healthy() -> Router {
    Router::new()
        .route("/api/systems", get(|| async { SYSTEMS }))
        .route("/scores.json", get(|| async { SCORES }))
}

fn broken() -> Router {
    Router::new()
        .route(
            "/api/systems",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/scores.json", get(|| async { (StatusCode::NOT_FOUND, "") }))
}

fn garbled() -> Router {
    Router::new()
        .route("/api/systems", get(|| async { "{\"systems\": [" }))
        .route("/scores.json", get(|| async { "not json" }))
}

#[tokio::test]
async fn test_fetch_systems_and_derive_topology() -> Result<()> {
    let addr = serve(healthy()).await?;
    let source = HttpSource::new(&format!("http://{}/", addr));

    let config = source.fetch_systems().await?;
    let topology = Topology::from_config(&config)?;

    let keys: Vec<&str> = topology.columns().iter().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["sys1ping", "sys1web"]);
    assert_eq!(topology.label(&"sys1web".into()), "Web (1)");
    Ok(())
}

#[tokio::test]
async fn test_fetch_snapshot() -> Result<()> {
    let addr = serve(healthy()).await?;
    let source = HttpSource::new(&format!("http://{}", addr));

    let snapshot = source.fetch_snapshot().await?.expect("snapshot");
    assert_eq!(snapshot.teams().collect::<Vec<_>>(), vec!["teamA"]);
    Ok(())
}

#[tokio::test]
async fn test_non_success_status() -> Result<()> {
    let addr = serve(broken()).await?;
    let source = HttpSource::new(&format!("http://{}", addr));

    match source.fetch_systems().await {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other.map(|_| ())),
    }
    // Snapshot pulls treat a bad status as "nothing yet".
    assert!(source.fetch_snapshot().await?.is_none());

    let mut store = TopologyStore::new(source);
    assert_eq!(*store.load().await, Topology::fallback());
    Ok(())
}

#[tokio::test]
async fn test_malformed_payloads() -> Result<()> {
    let addr = serve(garbled()).await?;
    let source = HttpSource::new(&format!("http://{}", addr));

    assert!(matches!(
        source.fetch_systems().await,
        Err(FetchError::Malformed { .. })
    ));
    assert!(matches!(
        source.fetch_snapshot().await,
        Err(FetchError::Malformed { .. })
    ));

    let mut store = TopologyStore::new(source);
    assert_eq!(*store.load().await, Topology::fallback());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_falls_back() -> Result<()> {
    // Bind and drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let source = HttpSource::new(&format!("http://{}", addr));
    assert!(matches!(
        source.fetch_systems().await,
        Err(FetchError::Transport(_))
    ));

    let mut store = TopologyStore::new(source);
    assert_eq!(store.load().await.len(), 6);
    Ok(())
}
