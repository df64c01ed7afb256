use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use crate::server::{AppState, SERVICE_NAME};

// -----------------------------------------------------------------------------
// ----- Handlers --------------------------------------------------------------

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "service": SERVICE_NAME,
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let api = &state.api;

    Json(json!({
        "success": true,
        "status": "operational",
        "timestamp": Utc::now(),
        "activeSessions": state.calls.len(),
        "signaling": {
            "connections": state.hub.connection_count(),
            "rooms": state.hub.room_count(),
        },
        "janus": {
            "url": api.gateway_url,
            "wsUrl": api.gateway_ws_url,
        },
        "recording": {
            "enabled": api.recording_enabled,
            "directory": api.recording_dir,
        },
    }))
}

/// What a browser client needs to bootstrap. The gateway secret never
/// appears here.
pub async fn client_config(State(state): State<AppState>) -> Json<Value> {
    let api = &state.api;

    Json(json!({
        "success": true,
        "config": {
            "janusUrl": api.gateway_url,
            "janusWsUrl": api.gateway_ws_url,
            "publicIp": api.public_ip,
            "sessionTimeout": api.session_timeout.as_millis() as u64,
            "recordingEnabled": api.recording_enabled,
        },
    }))
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
