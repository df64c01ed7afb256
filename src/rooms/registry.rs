use std::collections::{HashMap, HashSet};

use crate::shared_types::{ClientId, RoomId};

// -----------------------------------------------------------------------------
// ----- RoomRegistry ----------------------------------------------------------

/// Who is in which room, for fan-out only. The gateway owns the real rooms;
/// an entry here exists exactly while it has members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, HashSet<ClientId>>,
}

// -----------------------------------------------------------------------------
// ----- RoomRegistry: Public --------------------------------------------------

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `client` to `room`, creating the entry if needed. Returns false if
    /// it was already a member.
    pub fn join(&mut self, room: RoomId, client: ClientId) -> bool {
        self.rooms.entry(room).or_default().insert(client)
    }

    /// Removes `client` from `room` and drops the entry once it is empty.
    /// Returns whether the client was a member.
    pub fn leave(&mut self, room: RoomId, client: &ClientId) -> bool {
        let Some(members) = self.rooms.get_mut(&room) else {
            return false;
        };

        let removed = members.remove(client);
        if members.is_empty() {
            self.rooms.remove(&room);
        }

        removed
    }

    /// Members of `room` other than `except`.
    pub fn peers<'a>(
        &'a self,
        room: RoomId,
        except: &'a ClientId,
    ) -> impl Iterator<Item = &'a ClientId> + 'a {
        self.rooms
            .get(&room)
            .into_iter()
            .flatten()
            .filter(move |member| *member != except)
    }

    pub fn contains(&self, room: RoomId) -> bool {
        self.rooms.contains_key(&room)
    }

    pub fn member_count(&self, room: RoomId) -> usize {
        self.rooms.get(&room).map_or(0, HashSet::len)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
