//! HTTP and WebSocket surface consumed by the dashboard.

use crate::master_config::MasterConfig;
use crate::scores::ScoreFile;

use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// App State to share with routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MasterConfig>,
    pub scores: ScoreFile,
    pub tx: broadcast::Sender<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/systems", get(get_systems))
        .route("/scores.json", get(get_scores))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!("Scoreboard API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Systems and services only. Teams and credentials stay on the server.
async fn get_systems(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.systems_payload())
}

async fn get_scores(State(state): State<AppState>) -> impl IntoResponse {
    match state.scores.load() {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            debug!("No scores to serve: {:#}", e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

// WebSocket Handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Sends the current scores right away, then every change the watcher broadcasts.
///
/// Ends as soon as the client closes, even if no change is ever broadcast.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Subscribe first so a change landing between the read and the loop is not lost.
    let mut rx = state.tx.subscribe();
    info!("Dashboard client connected");

    match state.scores.frame() {
        Ok(frame) => {
            if socket.send(Message::Text(frame)).await.is_err() {
                return;
            }
        }
        Err(e) => debug!("No initial scores for new client: {:#}", e),
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Pings are answered by the socket itself.
                Some(Ok(_)) => {}
            },
            msg = rx.recv() => match msg {
                Ok(msg) => {
                    if socket.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Client lagged, skipped {} score frames", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    info!("Dashboard client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use futures::StreamExt;
    use scoreboard_core::topology::{SystemsConfig, Topology};
    use scoreboard_core::ScoreSnapshot;
    use tokio_tungstenite::connect_async;
    use tower::ServiceExt;

    fn state(scores_path: &str) -> AppState {
        let config: MasterConfig = serde_json::from_str(
            r#"{
                "teams": [{"id": "team1", "name": "Red", "password": "hunter2"}],
                "systems": [{"name": "sys1", "services": ["ping", "web"]}],
                "services": {"ping": {"display_name": "Ping"}, "web": {}}
            }"#,
        )
        .unwrap();
        let (tx, _) = broadcast::channel(4);
        AppState {
            config: Arc::new(config),
            scores: ScoreFile::new(std::env::temp_dir().join(scores_path)),
            tx,
        }
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body(router(state("none.json")), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_systems_feed_the_topology() {
        let (status, body) = get_body(router(state("none.json")), "/api/systems").await;
        assert_eq!(status, StatusCode::OK);

        let text = String::from_utf8(body).unwrap();
        assert!(!text.contains("hunter2"));
        let config: SystemsConfig = serde_json::from_str(&text).unwrap();
        let topology = Topology::from_config(&config).unwrap();
        assert_eq!(topology.label(&"sys1ping".into()), "Ping (1)");
        assert_eq!(topology.label(&"sys1web".into()), "web (1)");
    }

    #[tokio::test]
    async fn test_missing_scores_is_not_found() {
        let (status, _) = get_body(
            router(state(&format!("absent_{}.json", std::process::id()))),
            "/scores.json",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_scores_are_served_from_file() {
        let state = state(&format!("served_{}.json", std::process::id()));
        let initial = state.config.initial_scores();
        state.scores.save(&initial).unwrap();

        let (status, body) = get_body(router(state.clone()), "/scores.json").await;
        assert_eq!(status, StatusCode::OK);
        let served: ScoreSnapshot = serde_json::from_slice(&body).unwrap();
        assert_eq!(served, initial);

        let _ = std::fs::remove_file(state.scores.path());
    }

    async fn wait_for_receivers(tx: &broadcast::Sender<String>, expected: usize) -> bool {
        for _ in 0..200 {
            if tx.receiver_count() == expected {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_closed_client_releases_its_subscription() {
        let state = state(&format!("ws_close_{}.json", std::process::id()));
        let tx = state.tx.clone();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        let (mut client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
        assert!(wait_for_receivers(&tx, 1).await);

        // No scores change after this point, so only the close can end the handler.
        client.close(None).await.unwrap();
        drop(client);
        assert!(wait_for_receivers(&tx, 0).await);
    }

    #[tokio::test]
    async fn test_connected_client_gets_broadcasts() {
        let state = state(&format!("ws_push_{}.json", std::process::id()));
        let tx = state.tx.clone();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        let (mut client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
        assert!(wait_for_receivers(&tx, 1).await);
        tx.send(r#"{"event":"scores","data":{}}"#.to_string()).unwrap();

        let frame = tokio::time::timeout(std::time::Duration::from_secs(2), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(frame.into_text().unwrap(), r#"{"event":"scores","data":{}}"#);
    }
}
