use tokio::sync::mpsc;

use crate::errors::PreconditionError;
use crate::frontend::messages::ServerMessage;
use crate::gateway::{GatewaySessionId, HandleId};
use crate::shared_types::{ConnectionStage, Membership};

// -----------------------------------------------------------------------------
// ----- ConnectionSession -----------------------------------------------------

/// Per-socket record. Lives in the hub from connect until disconnect.
#[derive(Debug)]
pub struct ConnectionSession {
    pub(crate) stage: ConnectionStage,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionSession {
    pub(crate) fn new(outbox: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            stage: ConnectionStage::Connected,
            outbox,
        }
    }

    /// Queues `message` for the writer task. Returns false once the transport
    /// is gone; such messages are dropped.
    pub(crate) fn send(&self, message: ServerMessage) -> bool {
        if self.outbox.is_closed() {
            return false;
        }

        self.outbox.send(message).is_ok()
    }

    pub(crate) fn is_open(&self) -> bool {
        !self.outbox.is_closed()
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionSession: Transitions ----------------------------------------

impl ConnectionSession {
    pub(crate) fn require_connected(&self) -> Result<(), PreconditionError> {
        match self.stage {
            ConnectionStage::Connected => Ok(()),
            _ => Err(PreconditionError::SessionExists),
        }
    }

    pub(crate) fn require_session_only(&self) -> Result<GatewaySessionId, PreconditionError> {
        match self.stage {
            ConnectionStage::Connected => Err(PreconditionError::NoSession),
            ConnectionStage::SessionCreated { session_id } => Ok(session_id),
            _ => Err(PreconditionError::PluginAttached),
        }
    }

    pub(crate) fn require_handle(&self) -> Result<(GatewaySessionId, HandleId), PreconditionError> {
        match self.stage {
            ConnectionStage::Connected => Err(PreconditionError::NoSession),
            ConnectionStage::SessionCreated { .. } => Err(PreconditionError::NoHandle),
            _ => self.stage.handle().ok_or(PreconditionError::NoHandle),
        }
    }

    /// Attached but not in a room yet.
    pub(crate) fn require_attached_idle(
        &self,
    ) -> Result<(GatewaySessionId, HandleId), PreconditionError> {
        if let Some(membership) = self.stage.membership() {
            return Err(PreconditionError::AlreadyJoined(membership.room_id));
        }

        self.require_handle()
    }

    pub(crate) fn require_joined(
        &self,
    ) -> Result<(GatewaySessionId, HandleId, &Membership), PreconditionError> {
        match &self.stage {
            ConnectionStage::Joined {
                session_id,
                handle_id,
                membership,
            } => Ok((*session_id, *handle_id, membership)),
            _ => Err(PreconditionError::NotJoined),
        }
    }

    pub(crate) fn session_created(&mut self, session_id: GatewaySessionId) -> Result<(), PreconditionError> {
        self.require_connected()?;
        self.stage = ConnectionStage::SessionCreated { session_id };
        Ok(())
    }

    pub(crate) fn plugin_attached(
        &mut self,
        expected_session: GatewaySessionId,
        handle_id: HandleId,
    ) -> Result<(), PreconditionError> {
        if self.require_session_only()? != expected_session {
            return Err(PreconditionError::StageChanged);
        }

        self.stage = ConnectionStage::PluginAttached {
            session_id: expected_session,
            handle_id,
        };
        Ok(())
    }

    pub(crate) fn joined(
        &mut self,
        expected: (GatewaySessionId, HandleId),
        membership: Membership,
    ) -> Result<(), PreconditionError> {
        if self.require_attached_idle()? != expected {
            return Err(PreconditionError::StageChanged);
        }

        let (session_id, handle_id) = expected;
        self.stage = ConnectionStage::Joined {
            session_id,
            handle_id,
            membership,
        };
        Ok(())
    }

    /// Drops room membership, keeping session and handle. `None` if the
    /// connection was not in a room.
    pub(crate) fn left(&mut self) -> Option<Membership> {
        let ConnectionStage::Joined {
            session_id,
            handle_id,
            membership,
        } = &self.stage
        else {
            return None;
        };

        let (session_id, handle_id, membership) = (*session_id, *handle_id, membership.clone());
        self.stage = ConnectionStage::PluginAttached {
            session_id,
            handle_id,
        };
        Some(membership)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::RoomId;

    fn session() -> (ConnectionSession, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionSession::new(tx), rx)
    }

    fn membership() -> Membership {
        Membership {
            room_id: RoomId(100),
            display: "Bob".into(),
            role: "agent".into(),
        }
    }

    #[test]
    fn stages_advance_in_order() {
        let (mut conn, _rx) = session();
        let s = GatewaySessionId(1);
        let h = HandleId(2);

        assert_eq!(conn.require_handle(), Err(PreconditionError::NoSession));
        assert_eq!(
            conn.plugin_attached(s, h),
            Err(PreconditionError::NoSession)
        );

        conn.session_created(s).unwrap();
        assert_eq!(conn.session_created(s), Err(PreconditionError::SessionExists));
        assert_eq!(conn.require_handle(), Err(PreconditionError::NoHandle));

        conn.plugin_attached(s, h).unwrap();
        assert_eq!(
            conn.plugin_attached(s, h),
            Err(PreconditionError::PluginAttached)
        );
        assert_eq!(conn.require_joined().unwrap_err(), PreconditionError::NotJoined);

        conn.joined((s, h), membership()).unwrap();
        assert_eq!(
            conn.require_attached_idle(),
            Err(PreconditionError::AlreadyJoined(RoomId(100)))
        );
        assert_eq!(conn.require_handle(), Ok((s, h)));
    }

    #[test]
    fn stale_identifiers_are_refused() {
        let (mut conn, _rx) = session();
        conn.session_created(GatewaySessionId(1)).unwrap();

        assert_eq!(
            conn.plugin_attached(GatewaySessionId(9), HandleId(2)),
            Err(PreconditionError::StageChanged)
        );
    }

    #[test]
    fn left_returns_to_attached_once() {
        let (mut conn, _rx) = session();
        let s = GatewaySessionId(1);
        let h = HandleId(2);
        conn.session_created(s).unwrap();
        conn.plugin_attached(s, h).unwrap();
        conn.joined((s, h), membership()).unwrap();

        assert_eq!(conn.left(), Some(membership()));
        assert_eq!(conn.left(), None);
        assert_eq!(conn.stage, ConnectionStage::PluginAttached { session_id: s, handle_id: h });
    }

    #[test]
    fn send_fails_after_transport_closes() {
        let (conn, rx) = session();
        assert!(conn.send(ServerMessage::Left));
        drop(rx);
        assert!(!conn.is_open());
        assert!(!conn.send(ServerMessage::Left));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
