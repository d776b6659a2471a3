use anyhow::Result;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use scoreboard_core::feed::{FeedClient, FeedEvent, HttpSource, WsFeed};
use scoreboard_core::notice::NoticeBus;
use scoreboard_core::reconciler::CellClass;
use scoreboard_core::view::{GridUpdatePolicy, Page};
use scoreboard_core::Dashboard;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const SYSTEMS: &str = r#"{
    "systems": [
        {"name": "ubuntu1", "services": ["ping", "ssh"]},
        {"name": "ubuntu2", "services": ["web"]}
    ],
    "services": {"ping": {"display_name": "Ping"}, "ssh": {"display_name": "SSH"}, "web": {"display_name": "Web"}}
}"#;

const SCORES: &str = r#"{
    "team1": {"ubuntu1ping": {"error": "Success", "score": 10}, "ubuntu1ssh": {"error": "Not tested", "score": 0}},
    "team2": {"ubuntu2web": {"error": "Connection refused", "score": 5}}
}"#;

const PUSH: &str = r#"{"event": "scores", "data": {"team2": {"ubuntu2web": {"error": "Success", "score": 15}}}}"#;

async fn push_once(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket: WebSocket| async move {
        let _ = socket.send(Message::Text(PUSH.to_string())).await;
        // Keep the socket open until the client goes away.
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn serve() -> Result<SocketAddr> {
    let app = Router::new()
        .route("/api/systems", get(|| async { SYSTEMS }))
        .route("/scores.json", get(|| async { SCORES }))
        .route("/ws", get(push_once));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

async fn next<F: FeedClient>(feed: &mut F) -> Result<FeedEvent> {
    timeout(Duration::from_secs(5), feed.next_event())
        .await?
        .ok_or_else(|| anyhow::anyhow!("feed closed"))
}

#[tokio::test]
async fn test_dashboard_against_live_server() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let addr = serve().await?;
    let http = HttpSource::new(&format!("http://{}", addr));
    let bus = NoticeBus::new();

    let mut dashboard = Dashboard::start(
        &Page::standard(),
        http.clone(),
        http,
        Arc::new(bus.clone()),
        GridUpdatePolicy::InPlace,
    )
    .await?;

    // Topology from the server, initial pull applied.
    assert_eq!(dashboard.topology().len(), 3);
    let table = dashboard.grid().table().expect("grid built from pull");
    assert_eq!(table.header(), &["Team", "Ping (1)", "SSH (1)", "Web (2)"]);
    assert_eq!(
        table.cell("team2", &"ubuntu2web".into()).map(|c| c.class()),
        Some(CellClass::Fail)
    );

    let (mut feed, handle) =
        WsFeed::new(&format!("ws://{}/ws", addr), Duration::from_millis(50)).spawn();
    for _ in 0..2 {
        let event = next(&mut feed).await?;
        dashboard.handle(event).await;
    }

    let table = dashboard.grid().table().expect("grid");
    assert_eq!(
        table.cell("team2", &"ubuntu2web".into()).map(|c| c.class()),
        Some(CellClass::Ok)
    );
    assert_eq!(dashboard.chart().labels(), &["team1", "team2"]);
    assert_eq!(dashboard.chart().total("team2"), 15.0);
    assert!(bus.active().is_empty());

    drop(feed);
    handle.abort();
    Ok(())
}
