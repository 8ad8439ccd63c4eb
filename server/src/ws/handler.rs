use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /chat/{room}
/// WebSocket upgrade endpoint. The path segment names the room to relay
/// within; no authentication is consulted. On upgrade, spawns the actor for
/// the connection.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Path(room): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| actor::run_connection(socket, state, room))
}
