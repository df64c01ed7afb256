use crate::gateway::{GatewaySessionId, HandleId};
use crate::shared_types::RoomId;

/// Tracks how far a signaling connection has progressed through the gateway
/// handshake.
///
/// Every stage carries the identifiers acquired so far, so a handler can never
/// reach for a handle that was not attached or a room that was not joined. The
/// order is strict: each stage is only reachable from its predecessor (or, for
/// `PluginAttached`, back from `Joined` after a leave).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStage {
    /// Socket is open, nothing has been allocated on the gateway yet.
    Connected,

    /// A gateway session exists for this connection.
    SessionCreated { session_id: GatewaySessionId },

    /// The video-room plugin is attached on the session.
    PluginAttached {
        session_id: GatewaySessionId,
        handle_id: HandleId,
    },

    /// The connection is a member of `membership.room_id`. Publishing and
    /// subscribing happen while in this stage.
    Joined {
        session_id: GatewaySessionId,
        handle_id: HandleId,
        membership: Membership,
    },
}

/// Caller supplied labels recorded when a join succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: RoomId,
    pub display: String,
    pub role: String,
}

// -----------------------------------------------------------------------------
// ----- ConnectionStage: Public -----------------------------------------------

impl ConnectionStage {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionStage::Connected => "connected",
            ConnectionStage::SessionCreated { .. } => "session-created",
            ConnectionStage::PluginAttached { .. } => "plugin-attached",
            ConnectionStage::Joined { .. } => "joined",
        }
    }

    pub fn session_id(&self) -> Option<GatewaySessionId> {
        match self {
            ConnectionStage::Connected => None,
            ConnectionStage::SessionCreated { session_id }
            | ConnectionStage::PluginAttached { session_id, .. }
            | ConnectionStage::Joined { session_id, .. } => Some(*session_id),
        }
    }

    /// Session and handle, available once the plugin is attached.
    pub fn handle(&self) -> Option<(GatewaySessionId, HandleId)> {
        match self {
            ConnectionStage::PluginAttached {
                session_id,
                handle_id,
            }
            | ConnectionStage::Joined {
                session_id,
                handle_id,
                ..
            } => Some((*session_id, *handle_id)),
            _ => None,
        }
    }

    pub fn membership(&self) -> Option<&Membership> {
        match self {
            ConnectionStage::Joined { membership, .. } => Some(membership),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
