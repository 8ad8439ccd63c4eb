//! Room-scoped fan-out of relayed text frames.
//!
//! Delivery is a push into each member's outbound channel; the per-connection
//! writer task is the only place a socket send awaits, so a slow peer never
//! stalls the fan-out or the registry.

use axum::extract::ws::Message;

use crate::chat::registry::RoomRegistry;
use crate::ws::ConnectionId;

/// Separator between the sender identity and the relayed text.
const ATTRIBUTION_SEPARATOR: &str = " :: ";

/// Prefix a relayed frame with its sender attribution.
pub fn format_message(sender_identity: &str, text: &str) -> String {
    format!("{sender_identity}{ATTRIBUTION_SEPARATOR}{text}")
}

/// Deliver `text` to every current member of `room_id` except the sender.
///
/// Each delivery is attempted independently: a member whose actor has gone
/// away is logged and skipped, never aborting the rest of the fan-out. A
/// broadcast into an absent or just-emptied room delivers to no one and is
/// not an error. Returns the number of members the frame was handed to.
pub fn broadcast_to_room(
    registry: &RoomRegistry,
    room_id: &str,
    sender: ConnectionId,
    sender_identity: &str,
    text: &str,
) -> usize {
    let payload = format_message(sender_identity, text);

    let mut delivered = 0;
    for member in registry.members(room_id) {
        if member.id == sender {
            continue;
        }
        match member.sender.send(Message::Text(payload.clone().into())) {
            Ok(()) => delivered += 1,
            Err(_) => {
                tracing::debug!(
                    room = %room_id,
                    member = %member.id,
                    "Dropping frame for departed member"
                );
            }
        }
    }

    delivered
}
