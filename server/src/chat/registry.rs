//! Room registry: the shared membership tables of the relay.
//!
//! Rooms exist only while they have members. The registry is the single
//! piece of state shared across connection actors; every mutation is
//! serialized per room through the DashMap entry API, and lock scope never
//! covers socket I/O.

use std::collections::HashMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::chat::identity;
use crate::ws::{ConnectionId, ConnectionSender};

/// Errors surfaced by registry mutations. Both variants indicate a defect
/// in the calling session loop rather than a recoverable runtime condition,
/// so callers log them loudly instead of swallowing them.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// `join` called for a connection that is already joined somewhere.
    #[error("connection {id} already joined to room '{room}'")]
    AlreadyJoined { id: ConnectionId, room: String },

    /// `leave` called for a connection that is not a member of the room.
    #[error("connection {id} is not a member of room '{room}'")]
    NotAMember { id: ConnectionId, room: String },
}

/// Registry-side view of one connection. The socket itself stays with the
/// actor; the registry only holds the channel used to push frames at it.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: ConnectionId,
    pub identity: String,
    pub sender: ConnectionSender,
}

#[derive(Debug, Default)]
struct Room {
    members: HashMap<ConnectionId, Member>,
}

/// Shared room membership state. Constructed once at startup and injected
/// into every connection actor via `AppState`.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room identifier -> member set. Invariant: no entry is ever empty.
    rooms: DashMap<String, Room>,
    /// Which room each live connection is joined to.
    joined: DashMap<ConnectionId, String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a connection into a room, assigning its display identity.
    /// Creates the room entry on first join and returns the identity.
    ///
    /// A connection that is already joined anywhere is rejected without
    /// touching existing membership.
    pub fn join(
        &self,
        room_id: &str,
        id: ConnectionId,
        sender: ConnectionSender,
    ) -> Result<String, RegistryError> {
        match self.joined.entry(id) {
            Entry::Occupied(existing) => {
                return Err(RegistryError::AlreadyJoined {
                    id,
                    room: existing.get().clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(room_id.to_string());
            }
        }

        let display = identity::assign();
        let member = Member {
            id,
            identity: display.clone(),
            sender,
        };
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .members
            .insert(id, member);

        tracing::debug!(
            connection = %id,
            room = %room_id,
            "Member joined"
        );

        Ok(display)
    }

    /// Remove a connection from a room, discarding its identity mapping.
    /// The room entry is deleted inside the same critical section as the
    /// removal that empties it, so an empty room is never observable.
    ///
    /// A leave for a connection that is not a member of `room_id` returns
    /// `NotAMember` and leaves the registry untouched.
    pub fn leave(&self, room_id: &str, id: ConnectionId) -> Result<(), RegistryError> {
        if self
            .joined
            .remove_if(&id, |_, joined_room| joined_room == room_id)
            .is_none()
        {
            return Err(RegistryError::NotAMember {
                id,
                room: room_id.to_string(),
            });
        }

        if let Entry::Occupied(mut room) = self.rooms.entry(room_id.to_string()) {
            room.get_mut().members.remove(&id);
            if room.get().members.is_empty() {
                room.remove();
                tracing::debug!(room = %room_id, "Room emptied and removed");
            }
        }

        tracing::debug!(
            connection = %id,
            room = %room_id,
            "Member left"
        );

        Ok(())
    }

    /// Snapshot of a room's current membership. Returns owned copies so no
    /// registry lock is held while the caller fans out deliveries; an absent
    /// room yields an empty snapshot.
    pub fn members(&self, room_id: &str) -> Vec<Member> {
        self.rooms
            .get(room_id)
            .map(|room| room.members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of rooms that currently have at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Member count for a room, or `None` once the room has been removed.
    pub fn member_count(&self, room_id: &str) -> Option<usize> {
        self.rooms.get(room_id).map(|room| room.members.len())
    }

    /// Room identifiers with their member counts, for the rooms endpoint.
    pub fn rooms(&self) -> Vec<(String, usize)> {
        self.rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().members.len()))
            .collect()
    }
}
