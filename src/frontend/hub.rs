use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::PreconditionError;
use crate::frontend::context::ConnectionSession;
use crate::frontend::messages::ServerMessage;
use crate::gateway::{GatewayClient, GatewaySessionId};
use crate::rooms::{RoomPolicy, RoomRegistry};
use crate::shared_types::{ClientId, ConnectionStage, Membership, RoomId};

// -----------------------------------------------------------------------------
// ----- SignalingHub ----------------------------------------------------------

/// Owns every live connection record and the room registry.
///
/// The lock is only taken for short synchronous sections and never across a
/// gateway call, so handlers must look the connection up again after every
/// `.await` instead of trusting what they saw before it.
#[derive(Debug)]
pub struct SignalingHub {
    gateway: GatewayClient,
    policy: RoomPolicy,
    state: Mutex<HubState>,
}

#[derive(Debug, Default)]
pub(crate) struct HubState {
    pub(crate) connections: HashMap<ClientId, ConnectionSession>,
    pub(crate) rooms: RoomRegistry,
}

// -----------------------------------------------------------------------------
// ----- SignalingHub: Static --------------------------------------------------

impl SignalingHub {
    pub fn new(gateway: GatewayClient, policy: RoomPolicy) -> Self {
        Self {
            gateway,
            policy,
            state: Mutex::new(HubState::default()),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- SignalingHub: Public --------------------------------------------------

impl SignalingHub {
    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn policy(&self) -> &RoomPolicy {
        &self.policy
    }

    /// Registers a new connection. The receiver yields everything addressed
    /// to it; dropping the receiver marks the transport closed.
    pub fn connect(&self) -> (ClientId, mpsc::UnboundedReceiver<ServerMessage>) {
        let client_id = ClientId::generate();
        let (tx, rx) = mpsc::unbounded_channel();

        self.state
            .lock()
            .connections
            .insert(client_id.clone(), ConnectionSession::new(tx));

        info!(client_id = %client_id, "client connected");
        (client_id, rx)
    }

    pub fn send_to(&self, client: &ClientId, message: ServerMessage) -> bool {
        self.state
            .lock()
            .connections
            .get(client)
            .is_some_and(|conn| conn.send(message))
    }

    /// Delivers `message` to every open member of `room` except `sender`.
    /// Returns how many peers it reached.
    pub fn broadcast(&self, room: RoomId, sender: &ClientId, message: ServerMessage) -> usize {
        self.state.lock().broadcast(room, sender, &message)
    }

    /// Runs `f` against the live record of `client`.
    pub(crate) fn update<T>(
        &self,
        client: &ClientId,
        f: impl FnOnce(&mut ConnectionSession) -> Result<T, PreconditionError>,
    ) -> Result<T, PreconditionError> {
        let mut state = self.state.lock();
        let conn = state
            .connections
            .get_mut(client)
            .ok_or(PreconditionError::ConnectionClosed)?;
        f(conn)
    }

    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut HubState) -> T) -> T {
        f(&mut self.state.lock())
    }

    /// Takes `client` out of its room and tells the remaining members.
    /// Shared by `leave` and disconnect; a no-op when not in a room.
    pub fn leave_room(&self, client: &ClientId) -> Option<Membership> {
        self.state.lock().leave_room(client)
    }

    /// Tears a connection down: room removal with broadcast, then a
    /// best-effort gateway session destroy. Removing the record happens under
    /// the same lock as the room removal, so a second call finds nothing.
    pub async fn disconnect(&self, client: &ClientId) {
        let (session_id, stage) = {
            let mut state = self.state.lock();
            let Some(stage) = state.connections.get(client).map(|conn| conn.stage.name()) else {
                debug!(client_id = %client, "disconnect for unknown or torn down client");
                return;
            };

            state.leave_room(client);
            let session_id = state
                .connections
                .remove(client)
                .and_then(|conn| conn.stage.session_id());

            (session_id, stage)
        };

        if let Some(session_id) = session_id {
            self.release_session(session_id).await;
        }

        info!(client_id = %client, stage, "client disconnected");
    }

    /// Destroys a gateway session nobody will use anymore. Failures are only
    /// logged; there is no one left to tell.
    pub(crate) async fn release_session(&self, session_id: GatewaySessionId) {
        match self.gateway.destroy_session(session_id).await {
            Ok(()) => debug!(%session_id, "gateway session destroyed"),
            Err(err) => warn!(%session_id, error = %err, "gateway session destroy failed"),
        }
    }

    pub fn stage_of(&self, client: &ClientId) -> Option<ConnectionStage> {
        self.state
            .lock()
            .connections
            .get(client)
            .map(|conn| conn.stage.clone())
    }

    pub fn connection_count(&self) -> usize {
        self.state.lock().connections.len()
    }

    pub fn room_count(&self) -> usize {
        self.state.lock().rooms.room_count()
    }

    pub fn has_room(&self, room: RoomId) -> bool {
        self.state.lock().rooms.contains(room)
    }

    pub fn member_count(&self, room: RoomId) -> usize {
        self.state.lock().rooms.member_count(room)
    }
}

// -----------------------------------------------------------------------------
// ----- HubState --------------------------------------------------------------

impl HubState {
    pub(crate) fn broadcast(
        &self,
        room: RoomId,
        sender: &ClientId,
        message: &ServerMessage,
    ) -> usize {
        let mut delivered = 0;

        for peer in self.rooms.peers(room, sender) {
            let Some(conn) = self.connections.get(peer) else {
                continue;
            };

            if conn.is_open() && conn.send(message.clone()) {
                delivered += 1;
            }
        }

        delivered
    }

    pub(crate) fn leave_room(&mut self, client: &ClientId) -> Option<Membership> {
        let membership = self.connections.get_mut(client)?.left()?;

        self.rooms.leave(membership.room_id, client);

        let notice = ServerMessage::ParticipantLeft {
            room_id: membership.room_id,
            display: membership.display.clone(),
            role: membership.role.clone(),
        };
        let notified = self.broadcast(membership.room_id, client, &notice);

        info!(
            client_id = %client,
            room_id = %membership.room_id,
            role = %membership.role,
            notified,
            "participant left"
        );

        Some(membership)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
