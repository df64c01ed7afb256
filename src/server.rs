use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, ApiSettings, CallStore};
use crate::frontend::{SignalingConnection, SignalingHub};

pub const SERVICE_NAME: &str = "callbridge";

// -----------------------------------------------------------------------------
// ----- AppState --------------------------------------------------------------

/// Shared state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<SignalingHub>,
    pub calls: Arc<CallStore>,
    pub api: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(hub: Arc<SignalingHub>, api: ApiSettings) -> Self {
        Self {
            hub,
            calls: Arc::new(CallStore::new()),
            api: Arc::new(api),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Router ----------------------------------------------------------------

/// WebSocket signaling at `/ws`, health at `/health`, REST under `/api`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(api::status::health))
        .nest("/api", api::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves until `shutdown` resolves. Open WebSockets are not waited for.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

// -----------------------------------------------------------------------------
// ----- Internal: Handlers ----------------------------------------------------

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<SignalingHub>) {
    SignalingConnection::new(socket, hub).serve().await;
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
