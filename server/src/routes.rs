use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// One row of the rooms snapshot.
#[derive(Debug, Serialize)]
pub struct RoomSummary {
    pub room: String,
    pub members: usize,
}

/// GET /api/rooms — Current rooms and their member counts. A room appears
/// here only while it has at least one member.
async fn list_rooms(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<Vec<RoomSummary>> {
    let mut rooms: Vec<RoomSummary> = state
        .rooms
        .rooms()
        .into_iter()
        .map(|(room, members)| RoomSummary { room, members })
        .collect();
    rooms.sort_by(|a, b| a.room.cmp(&b.room));
    Json(rooms)
}

/// Build the full axum Router with all routes.
pub fn build_router(state: AppState) -> Router {
    // WebSocket relay endpoint (room named by the path segment)
    let ws_routes = Router::new().route(
        "/chat/{room}",
        axum::routing::get(ws_handler::ws_upgrade),
    );

    // Read-only observability surface
    let api_routes = Router::new().route("/api/rooms", axum::routing::get(list_rooms));

    // Health check
    let health = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(ws_routes)
        .merge(api_routes)
        .merge(health)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
