use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::shared_types::RoomId;

// -----------------------------------------------------------------------------
// ----- GatewayError ----------------------------------------------------------

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered and refused the request. Displays as the gateway's
    /// own reason so it can be relayed to the browser verbatim.
    #[error("{reason}")]
    Rejected { code: Option<i64>, reason: String },

    #[error("gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway did not answer within {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("unexpected gateway reply: {0}")]
    UnexpectedReply(String),
}

impl GatewayError {
    /// True when the request may never have reached the gateway.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_) | GatewayError::Timeout(_))
    }
}

// -----------------------------------------------------------------------------
// ----- PreconditionError -----------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("gateway session already created for this connection")]
    SessionExists,

    #[error("no gateway session; send create-session first")]
    NoSession,

    #[error("plugin already attached for this connection")]
    PluginAttached,

    #[error("plugin not attached; send attach-plugin first")]
    NoHandle,

    #[error("already joined room {0}; leave it first")]
    AlreadyJoined(RoomId),

    #[error("not in a room; send join-room first")]
    NotJoined,

    #[error("connection state changed while the request was in flight")]
    StageChanged,

    #[error("connection closed")]
    ConnectionClosed,
}

// -----------------------------------------------------------------------------
// ----- BridgeError -----------------------------------------------------------

/// Everything a client frame can fail with. Each variant ends up as an
/// `error` message to the sender; none of them close the connection.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

// -----------------------------------------------------------------------------
// ----- ApiError --------------------------------------------------------------

/// Failures of the REST endpoints, rendered as `{ success: false, error }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
