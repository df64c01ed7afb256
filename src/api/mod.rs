use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::routing::get;

use crate::server::AppState;

pub mod calls;
pub mod recordings;
pub mod status;

pub use calls::{CallRecord, CallStore};

// -----------------------------------------------------------------------------
// ----- ApiSettings -----------------------------------------------------------

/// Values the REST endpoints report back. Resolved once at startup.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub gateway_url: String,
    pub gateway_ws_url: String,
    pub public_ip: String,
    pub session_timeout: Duration,
    pub recording_enabled: bool,
    pub recording_dir: String,
    pub recordings_dir: PathBuf,
}

// -----------------------------------------------------------------------------
// ----- Router ----------------------------------------------------------------

/// Everything mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(calls::list_calls).post(calls::create_call))
        .route(
            "/sessions/{id}",
            get(calls::get_call)
                .patch(calls::update_call)
                .delete(calls::end_call),
        )
        .route("/recordings", get(recordings::list_recordings))
        .route("/status", get(status::status))
        .route("/config", get(status::client_config))
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
