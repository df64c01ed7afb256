use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BridgeError;
use crate::gateway::{GatewaySessionId, HandleId};
use crate::shared_types::{FeedId, RoomId};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const KNOWN_TYPES: &[&str] = &[
    "create-session",
    "attach-plugin",
    "create-room",
    "join-room",
    "publish",
    "subscribe",
    "configure",
    "trickle",
    "leave",
];

// -----------------------------------------------------------------------------
// ----- Inbound ---------------------------------------------------------------

/// Result of decoding one text frame from the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Request(ClientRequest),
    /// Well-formed JSON with a `type` the bridge does not handle.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientRequest {
    CreateSession,

    AttachPlugin,

    CreateRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, rename = "maxPublishers")]
        max_publishers: Option<u32>,
    },

    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        display: String,
        role: String,
    },

    Publish {
        jsep: Value,
        #[serde(default)]
        audio: Option<bool>,
        #[serde(default)]
        video: Option<bool>,
    },

    Subscribe {
        feed: FeedId,
        jsep: Value,
    },

    Configure {
        #[serde(default)]
        audio: Option<bool>,
        #[serde(default)]
        video: Option<bool>,
        #[serde(default)]
        jsep: Option<Value>,
    },

    Trickle {
        candidate: Value,
    },

    Leave,
}

impl Inbound {
    pub fn decode(text: &str) -> Result<Inbound, BridgeError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BridgeError::MalformedMessage(format!("invalid JSON: {e}")))?;

        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Err(BridgeError::MalformedMessage(
                "missing string field 'type'".to_string(),
            ));
        };

        if !KNOWN_TYPES.contains(&kind) {
            return Ok(Inbound::Unknown(kind.to_string()));
        }

        let kind = kind.to_string();
        serde_json::from_value(value)
            .map(Inbound::Request)
            .map_err(|e| BridgeError::MalformedMessage(format!("invalid {kind} message: {e}")))
    }
}

impl ClientRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientRequest::CreateSession => "create-session",
            ClientRequest::AttachPlugin => "attach-plugin",
            ClientRequest::CreateRoom { .. } => "create-room",
            ClientRequest::JoinRoom { .. } => "join-room",
            ClientRequest::Publish { .. } => "publish",
            ClientRequest::Subscribe { .. } => "subscribe",
            ClientRequest::Configure { .. } => "configure",
            ClientRequest::Trickle { .. } => "trickle",
            ClientRequest::Leave => "leave",
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ServerMessage ---------------------------------------------------------

/// Everything the bridge sends to a browser, replies and unsolicited events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    SessionCreated {
        #[serde(rename = "sessionId")]
        session_id: GatewaySessionId,
    },

    PluginAttached {
        #[serde(rename = "handleId")]
        handle_id: HandleId,
    },

    RoomCreated {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        data: Value,
    },

    JoinedRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        role: String,
        data: Value,
    },

    ParticipantJoined {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        display: String,
        role: String,
    },

    Published {
        jsep: Option<Value>,
    },

    Subscribed {
        feed: FeedId,
        jsep: Option<Value>,
    },

    Configured {
        jsep: Option<Value>,
    },

    Left,

    ParticipantLeft {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        display: String,
        role: String,
    },

    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        // Only strings, numbers and already-valid JSON values end up in here.
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"failed to encode reply: {e}"}}"#)
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
