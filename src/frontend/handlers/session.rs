use tracing::info;

use crate::errors::{BridgeError, PreconditionError};
use crate::frontend::hub::SignalingHub;
use crate::frontend::messages::ServerMessage;
use crate::shared_types::ClientId;

// -----------------------------------------------------------------------------
// ----- Create Session Handler ------------------------------------------------

pub(crate) async fn handle_create_session(
    hub: &SignalingHub,
    client: &ClientId,
) -> Result<(), BridgeError> {
    hub.update(client, |conn| conn.require_connected())?;

    let session_id = hub.gateway().create_session().await?;

    let stored = hub.update(client, |conn| {
        conn.session_created(session_id)?;
        conn.send(ServerMessage::SessionCreated { session_id });
        Ok(())
    });

    if let Err(err) = stored {
        // The connection went away (or raced itself) while the gateway was
        // allocating; nobody owns this session now.
        hub.release_session(session_id).await;
        return Err(err.into());
    }

    info!(client_id = %client, %session_id, "gateway session created");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Attach Plugin Handler -------------------------------------------------

pub(crate) async fn handle_attach_plugin(
    hub: &SignalingHub,
    client: &ClientId,
) -> Result<(), BridgeError> {
    let session_id = hub.update(client, |conn| conn.require_session_only())?;

    let handle_id = hub.gateway().attach_videoroom(session_id).await?;

    hub.update(client, |conn| {
        conn.plugin_attached(session_id, handle_id)?;
        conn.send(ServerMessage::PluginAttached { handle_id });
        Ok::<_, PreconditionError>(())
    })?;

    info!(client_id = %client, %session_id, %handle_id, "video room plugin attached");
    Ok(())
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
