use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::chat::broadcast;
use crate::state::AppState;
use crate::ws::ConnectionId;

/// Run the actor-per-connection pattern for one relay client.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards frames from an mpsc channel
/// - Reader loop: relays each inbound text frame to the rest of the room
///
/// The mpsc channel is what the registry hands to other actors so they can
/// push frames at this client without touching its socket.
pub async fn run_connection(socket: WebSocket, state: AppState, room: String) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let id: ConnectionId = uuid::Uuid::new_v4();

    // Join before reading any frame. A rejected join discards the connection
    // without ever entering the receive loop, and without a paired leave.
    let identity = match state.rooms.join(&room, id, tx.clone()) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::error!(
                connection = %id,
                room = %room,
                error = %err,
                "Join rejected"
            );
            return;
        }
    };

    tracing::info!(
        connection = %id,
        room = %room,
        identity = %identity,
        "Connection joined"
    );

    // Spawn writer task: forwards mpsc frames to the WebSocket sink.
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Reader loop: waiting for the next inbound frame is the actor's only
    // suspension point while it holds no registry lock.
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    let delivered = broadcast::broadcast_to_room(
                        &state.rooms,
                        &room,
                        id,
                        &identity,
                        text.as_str(),
                    );
                    tracing::debug!(
                        connection = %id,
                        room = %room,
                        delivered = delivered,
                        "Relayed text frame"
                    );
                }
                Message::Binary(data) => {
                    // The relay protocol is text-only; tolerate and ignore.
                    tracing::debug!(
                        connection = %id,
                        room = %room,
                        len = data.len(),
                        "Ignoring binary frame"
                    );
                }
                Message::Ping(data) => {
                    // Respond to client pings with pong
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Pong(_) => {}
                Message::Close(frame) => {
                    tracing::info!(
                        connection = %id,
                        room = %room,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
            },
            Some(Err(e)) => {
                // Transport failure: same cleanup path as a normal close,
                // reported as an anomaly.
                tracing::warn!(
                    connection = %id,
                    room = %room,
                    error = %e,
                    "WebSocket receive error"
                );
                break;
            }
            None => {
                // Stream ended — client disconnected
                tracing::info!(connection = %id, room = %room, "WebSocket stream ended");
                break;
            }
        }
    }

    writer_handle.abort();

    // Leave exactly once, on every exit path out of the loop. A failure here
    // means the membership tables disagree with this actor's lifecycle.
    if let Err(err) = state.rooms.leave(&room, id) {
        tracing::error!(
            connection = %id,
            room = %room,
            error = %err,
            "Leave failed"
        );
    }

    tracing::info!(connection = %id, room = %room, "Connection closed");
}

/// Writer task: receives frames from the mpsc channel and forwards them to
/// the WebSocket sink. Exits when the channel closes or the peer stops
/// accepting writes.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}
