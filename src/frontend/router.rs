use tracing::{error, warn};

use crate::errors::BridgeError;
use crate::frontend::handlers::*;
use crate::frontend::hub::SignalingHub;
use crate::frontend::messages::{ClientRequest, Inbound, ServerMessage};
use crate::shared_types::ClientId;

// -----------------------------------------------------------------------------
// ----- Router ----------------------------------------------------------------

/// Handles one text frame from `client`. Failures become an `error` message
/// to that client and never touch anyone else's state.
pub async fn dispatch(hub: &SignalingHub, client: &ClientId, frame: &str) {
    let (kind, result) = match Inbound::decode(frame) {
        Ok(Inbound::Request(request)) => {
            let kind = request.kind();
            (kind, route(hub, client, request).await)
        }
        Ok(Inbound::Unknown(kind)) => {
            warn!(client_id = %client, kind = %kind, "ignoring unknown message type");
            return;
        }
        Err(err) => ("frame", Err(err)),
    };

    let Err(err) = result else {
        return;
    };

    match &err {
        BridgeError::Gateway(gateway) if gateway.is_transport() => {
            error!(client_id = %client, kind, error = %err, "gateway unavailable")
        }
        _ => warn!(client_id = %client, kind, error = %err, "request failed"),
    }

    hub.send_to(client, ServerMessage::error(err.to_string()));
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

async fn route(
    hub: &SignalingHub,
    client: &ClientId,
    request: ClientRequest,
) -> Result<(), BridgeError> {
    match request {
        ClientRequest::CreateSession => handle_create_session(hub, client).await,
        ClientRequest::AttachPlugin => handle_attach_plugin(hub, client).await,
        ClientRequest::CreateRoom {
            room_id,
            description,
            max_publishers,
        } => handle_create_room(hub, client, room_id, description, max_publishers).await,
        ClientRequest::JoinRoom {
            room_id,
            display,
            role,
        } => handle_join_room(hub, client, room_id, display, role).await,
        ClientRequest::Publish { jsep, audio, video } => {
            handle_publish(hub, client, jsep, audio, video).await
        }
        ClientRequest::Subscribe { feed, jsep } => handle_subscribe(hub, client, feed, jsep).await,
        ClientRequest::Configure { audio, video, jsep } => {
            handle_configure(hub, client, audio, video, jsep).await
        }
        ClientRequest::Trickle { candidate } => handle_trickle(hub, client, candidate).await,
        ClientRequest::Leave => handle_leave(hub, client),
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
