pub mod actor;
pub mod handler;

use tokio::sync::mpsc;

/// Runtime identity of one accepted connection. Assigned server-side at
/// accept time, never chosen by the client.
pub type ConnectionId = uuid::Uuid;

/// Type alias for the sender half of a WebSocket connection's channel.
/// The registry clones this to push frames at a specific client; the paired
/// writer task owns the socket sink.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;
