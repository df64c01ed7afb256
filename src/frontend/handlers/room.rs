use serde_json::json;
use tracing::info;

use crate::errors::{BridgeError, PreconditionError};
use crate::frontend::hub::SignalingHub;
use crate::frontend::messages::ServerMessage;
use crate::shared_types::{ClientId, Membership, RoomId};

// -----------------------------------------------------------------------------
// ----- Create Room Handler ---------------------------------------------------

pub(crate) async fn handle_create_room(
    hub: &SignalingHub,
    client: &ClientId,
    room_id: RoomId,
    description: Option<String>,
    max_publishers: Option<u32>,
) -> Result<(), BridgeError> {
    let (session_id, handle_id) = hub.update(client, |conn| conn.require_handle())?;

    let body = hub
        .policy()
        .create_request(room_id, description.as_deref(), max_publishers);
    let reply = hub
        .gateway()
        .message(session_id, handle_id, body, None)
        .await?;

    // The registry only tracks occupied rooms; `join-room` adds the entry.
    hub.update(client, |conn| {
        conn.send(ServerMessage::RoomCreated {
            room_id,
            data: reply.into_body(),
        });
        Ok(())
    })?;

    info!(client_id = %client, %room_id, "room created");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Join Room Handler -----------------------------------------------------

pub(crate) async fn handle_join_room(
    hub: &SignalingHub,
    client: &ClientId,
    room_id: RoomId,
    display: String,
    role: String,
) -> Result<(), BridgeError> {
    let ids = hub.update(client, |conn| conn.require_attached_idle())?;
    let (session_id, handle_id) = ids;

    let gateway_display = if display.trim().is_empty() {
        role.as_str()
    } else {
        display.as_str()
    };
    let body = json!({
        "request": "join",
        "room": room_id.0,
        "ptype": "publisher",
        "display": gateway_display,
    });
    let reply = hub
        .gateway()
        .message(session_id, handle_id, body, None)
        .await?;

    let notified = hub.with_state(|state| {
        let conn = state
            .connections
            .get_mut(client)
            .ok_or(PreconditionError::ConnectionClosed)?;

        conn.joined(
            ids,
            Membership {
                room_id,
                display: display.clone(),
                role: role.clone(),
            },
        )?;

        // The joiner hears about its own join first, peers after.
        conn.send(ServerMessage::JoinedRoom {
            room_id,
            role: role.clone(),
            data: reply.into_body(),
        });

        state.rooms.join(room_id, client.clone());

        let notice = ServerMessage::ParticipantJoined {
            room_id,
            display: display.clone(),
            role: role.clone(),
        };
        Ok::<_, PreconditionError>(state.broadcast(room_id, client, &notice))
    })?;

    info!(client_id = %client, %room_id, %role, notified, "participant joined");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Leave Handler ---------------------------------------------------------

/// Leaving twice is fine: the second call only repeats the `left` reply.
pub(crate) fn handle_leave(hub: &SignalingHub, client: &ClientId) -> Result<(), BridgeError> {
    hub.with_state(|state| {
        if !state.connections.contains_key(client) {
            return Err(PreconditionError::ConnectionClosed);
        }

        state.leave_room(client);

        if let Some(conn) = state.connections.get(client) {
            conn.send(ServerMessage::Left);
        }
        Ok(())
    })?;

    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::handlers::session::{handle_attach_plugin, handle_create_session};
    use crate::test_support::{drain, fake_gateway, gateway_calls, hub_for};

    async fn attached(hub: &SignalingHub) -> (ClientId, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) {
        let (client, mut rx) = hub.connect();
        handle_create_session(hub, &client).await.unwrap();
        handle_attach_plugin(hub, &client).await.unwrap();
        drain(&mut rx);
        (client, rx)
    }

    #[tokio::test]
    async fn create_room_leaves_registry_untouched() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, mut rx) = attached(&hub).await;

        handle_create_room(&hub, &alice, RoomId(7), Some("Desk 7".into()), None)
            .await
            .unwrap();

        assert!(!hub.has_room(RoomId(7)));
        assert_eq!(hub.room_count(), 0);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServerMessage::RoomCreated { room_id: RoomId(7), .. }]
        ));

        let creates = gateway_calls(&server, "create").await;
        let body = &creates.last().unwrap()["body"];
        assert_eq!(body["room"], 7);
        assert_eq!(body["description"], "Desk 7");
    }

    #[tokio::test]
    async fn creator_disconnect_leaves_no_room_behind() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, _rx) = attached(&hub).await;

        handle_create_room(&hub, &alice, RoomId(9), None, None)
            .await
            .unwrap();
        hub.disconnect(&alice).await;

        assert_eq!(hub.connection_count(), 0);
        assert_eq!(hub.room_count(), 0);
        assert!(!hub.has_room(RoomId(9)));
    }

    #[tokio::test]
    async fn join_after_create_registers_the_room() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, _rx) = attached(&hub).await;

        handle_create_room(&hub, &alice, RoomId(11), None, None)
            .await
            .unwrap();
        handle_join_room(&hub, &alice, RoomId(11), "Alice".into(), "agent".into())
            .await
            .unwrap();

        assert!(hub.has_room(RoomId(11)));
        assert_eq!(hub.member_count(RoomId(11)), 1);
    }

    #[tokio::test]
    async fn join_replies_before_peers_hear_about_it() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, mut alice_rx) = attached(&hub).await;
        let (bob, mut bob_rx) = attached(&hub).await;

        handle_join_room(&hub, &alice, RoomId(100), "Alice".into(), "customer".into())
            .await
            .unwrap();
        handle_join_room(&hub, &bob, RoomId(100), "Bob".into(), "agent".into())
            .await
            .unwrap();

        let alice_msgs = drain(&mut alice_rx);
        assert!(matches!(alice_msgs[0], ServerMessage::JoinedRoom { .. }));
        assert_eq!(
            alice_msgs[1],
            ServerMessage::ParticipantJoined {
                room_id: RoomId(100),
                display: "Bob".into(),
                role: "agent".into(),
            }
        );
        assert_eq!(alice_msgs.len(), 2);

        let bob_msgs = drain(&mut bob_rx);
        assert_eq!(bob_msgs.len(), 1);
        assert!(matches!(bob_msgs[0], ServerMessage::JoinedRoom { ref role, .. } if role == "agent"));

        assert_eq!(hub.member_count(RoomId(100)), 2);
    }

    #[tokio::test]
    async fn join_requires_attached_plugin() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, _rx) = hub.connect();

        let err = handle_join_room(&hub, &alice, RoomId(1), "A".into(), "agent".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Precondition(PreconditionError::NoSession)
        ));
        assert!(!hub.has_room(RoomId(1)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn join_twice_is_refused() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, _rx) = attached(&hub).await;

        handle_join_room(&hub, &alice, RoomId(1), "A".into(), "agent".into())
            .await
            .unwrap();
        let err = handle_join_room(&hub, &alice, RoomId(2), "A".into(), "agent".into())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Precondition(PreconditionError::AlreadyJoined(RoomId(1)))
        ));
        assert!(!hub.has_room(RoomId(2)));
    }

    #[tokio::test]
    async fn empty_display_falls_back_to_role_at_the_gateway() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, _rx) = attached(&hub).await;

        handle_join_room(&hub, &alice, RoomId(3), "".into(), "agent".into())
            .await
            .unwrap();

        let joins = gateway_calls(&server, "join").await;
        assert_eq!(joins[0]["body"]["display"], "agent");
        assert_eq!(joins[0]["body"]["ptype"], "publisher");
    }

    #[tokio::test]
    async fn leave_twice_broadcasts_once() {
        let server = fake_gateway().await;
        let hub = hub_for(&server);
        let (alice, mut alice_rx) = attached(&hub).await;
        let (bob, mut bob_rx) = attached(&hub).await;

        handle_join_room(&hub, &alice, RoomId(100), "Alice".into(), "customer".into())
            .await
            .unwrap();
        handle_join_room(&hub, &bob, RoomId(100), "Bob".into(), "agent".into())
            .await
            .unwrap();
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        handle_leave(&hub, &alice).unwrap();
        handle_leave(&hub, &alice).unwrap();

        assert_eq!(drain(&mut alice_rx), vec![ServerMessage::Left, ServerMessage::Left]);
        assert_eq!(
            drain(&mut bob_rx),
            vec![ServerMessage::ParticipantLeft {
                room_id: RoomId(100),
                display: "Alice".into(),
                role: "customer".into(),
            }]
        );

        handle_leave(&hub, &bob).unwrap();
        assert!(!hub.has_room(RoomId(100)));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
