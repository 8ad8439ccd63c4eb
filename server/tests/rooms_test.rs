//! Integration tests for room lifecycle and the observability endpoints:
//! implicit create-on-join, delete-on-last-leave, and the /api/rooms view.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use parley_server::state::AppState;

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Helper: start the server on a random port and return (state, base_url, addr).
async fn start_test_server() -> (AppState, String, SocketAddr) {
    let state = AppState::new();
    let app = parley_server::routes::build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{}", addr);
    (state, base_url, addr)
}

/// Helper: open a relay connection to the given room.
async fn connect(addr: SocketAddr, room: &str) -> WsStream {
    let ws_url = format!("ws://{}/chat/{}", addr, room);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream
}

/// Helper: fetch /api/rooms as JSON.
async fn fetch_rooms(base_url: &str) -> serde_json::Value {
    let resp = reqwest::get(format!("{}/api/rooms", base_url))
        .await
        .expect("Failed to fetch /api/rooms");
    assert_eq!(resp.status(), 200);
    resp.json().await.expect("Invalid JSON from /api/rooms")
}

/// Helper: poll /api/rooms until it matches the expected value.
async fn wait_for_rooms(base_url: &str, expected: &serde_json::Value) {
    let mut last = serde_json::Value::Null;
    for _ in 0..100 {
        last = fetch_rooms(base_url).await;
        if &last == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("/api/rooms never reached {}, last saw {}", expected, last);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_state, base_url, _addr) = start_test_server().await;

    let resp = reqwest::get(format!("{}/health", base_url))
        .await
        .expect("Failed to fetch /health");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_rooms_endpoint_tracks_membership() {
    let (_state, base_url, addr) = start_test_server().await;

    // No connections yet: no rooms.
    assert_eq!(fetch_rooms(&base_url).await, serde_json::json!([]));

    let conn_a = connect(addr, "lobby").await;
    let conn_b = connect(addr, "lobby").await;
    let conn_c = connect(addr, "side").await;

    wait_for_rooms(
        &base_url,
        &serde_json::json!([
            { "room": "lobby", "members": 2 },
            { "room": "side", "members": 1 },
        ]),
    )
    .await;

    // Closing one lobby connection shrinks the count but keeps the room.
    let (mut write_b, _read_b) = conn_b.split();
    write_b
        .send(Message::Close(None))
        .await
        .expect("Failed to send close");
    wait_for_rooms(
        &base_url,
        &serde_json::json!([
            { "room": "lobby", "members": 1 },
            { "room": "side", "members": 1 },
        ]),
    )
    .await;

    // Closing the rest removes both rooms entirely.
    drop(conn_a);
    drop(conn_c);
    wait_for_rooms(&base_url, &serde_json::json!([])).await;
}

#[tokio::test]
async fn test_room_absent_after_sole_member_disconnects() {
    let (state, base_url, addr) = start_test_server().await;

    let conn = connect(addr, "x").await;
    wait_for_rooms(&base_url, &serde_json::json!([{ "room": "x", "members": 1 }])).await;

    drop(conn);
    wait_for_rooms(&base_url, &serde_json::json!([])).await;
    assert_eq!(state.rooms.room_count(), 0);
    assert_eq!(state.rooms.member_count("x"), None);
}

#[tokio::test]
async fn test_same_room_id_is_fresh_after_reuse() {
    let (state, _base_url, addr) = start_test_server().await;

    let conn = connect(addr, "lobby").await;
    for _ in 0..100 {
        if state.rooms.member_count("lobby") == Some(1) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    drop(conn);
    for _ in 0..100 {
        if state.rooms.member_count("lobby").is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state.rooms.member_count("lobby"), None);

    // Re-joining the same identifier creates a brand-new room.
    let _conn2 = connect(addr, "lobby").await;
    for _ in 0..100 {
        if state.rooms.member_count("lobby") == Some(1) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state.rooms.member_count("lobby"), Some(1));
}
