use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::errors::BridgeError;
use crate::frontend::hub::SignalingHub;
use crate::frontend::messages::ServerMessage;
use crate::shared_types::{ClientId, FeedId};

// -----------------------------------------------------------------------------
// ----- Publish Handler -------------------------------------------------------

pub(crate) async fn handle_publish(
    hub: &SignalingHub,
    client: &ClientId,
    jsep: Value,
    audio: Option<bool>,
    video: Option<bool>,
) -> Result<(), BridgeError> {
    let (session_id, handle_id) =
        hub.update(client, |conn| conn.require_joined().map(|(s, h, _)| (s, h)))?;

    let body = json!({
        "request": "configure",
        "audio": audio.unwrap_or(true),
        "video": video.unwrap_or(true),
    });
    let reply = hub
        .gateway()
        .message(session_id, handle_id, body, Some(jsep))
        .await?;

    hub.update(client, |conn| {
        conn.send(ServerMessage::Published { jsep: reply.jsep() });
        Ok(())
    })?;

    info!(client_id = %client, "stream published");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Subscribe Handler -----------------------------------------------------

pub(crate) async fn handle_subscribe(
    hub: &SignalingHub,
    client: &ClientId,
    feed: FeedId,
    jsep: Value,
) -> Result<(), BridgeError> {
    let (session_id, handle_id, room_id) = hub.update(client, |conn| {
        conn.require_joined()
            .map(|(s, h, membership)| (s, h, membership.room_id))
    })?;

    let body = json!({
        "request": "start",
        "room": room_id.0,
        "feed": feed.0,
    });
    let reply = hub
        .gateway()
        .message(session_id, handle_id, body, Some(jsep))
        .await?;

    hub.update(client, |conn| {
        conn.send(ServerMessage::Subscribed {
            feed,
            jsep: reply.jsep(),
        });
        Ok(())
    })?;

    info!(client_id = %client, %room_id, %feed, "feed subscribed");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Configure Handler -----------------------------------------------------

/// Partial update: only the flags the client actually sent are forwarded.
pub(crate) async fn handle_configure(
    hub: &SignalingHub,
    client: &ClientId,
    audio: Option<bool>,
    video: Option<bool>,
    jsep: Option<Value>,
) -> Result<(), BridgeError> {
    let (session_id, handle_id) =
        hub.update(client, |conn| conn.require_joined().map(|(s, h, _)| (s, h)))?;

    let mut body = Map::new();
    body.insert("request".into(), "configure".into());
    if let Some(audio) = audio {
        body.insert("audio".into(), audio.into());
    }
    if let Some(video) = video {
        body.insert("video".into(), video.into());
    }

    let reply = hub
        .gateway()
        .message(session_id, handle_id, Value::Object(body), jsep)
        .await?;

    hub.update(client, |conn| {
        conn.send(ServerMessage::Configured { jsep: reply.jsep() });
        Ok(())
    })?;

    debug!(client_id = %client, ?audio, ?video, "stream reconfigured");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Trickle Handler -------------------------------------------------------

/// No reply on success.
pub(crate) async fn handle_trickle(
    hub: &SignalingHub,
    client: &ClientId,
    candidate: Value,
) -> Result<(), BridgeError> {
    let (session_id, handle_id) = hub.update(client, |conn| conn.require_handle())?;

    hub.gateway()
        .trickle(session_id, handle_id, candidate)
        .await?;

    debug!(client_id = %client, "ice candidate forwarded");
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
