use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use callbridge::{AppState, Config, GatewayClient, SignalingHub, serve};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "📞 callbridge";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() -> std::io::Result<()> {
    setup().await;
    run_forever().await
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() {
    // This has to be the first thing we do, because it initializes the config
    Config::init().await;

    init_tracing();
}

fn init_tracing() {
    let config = Config::snapshot();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.filter_directive()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run_forever() -> std::io::Result<()> {
    let config = Config::snapshot();

    let gateway = GatewayClient::new(config.gateway.clone()).map_err(|e| {
        error!("cannot build gateway client: {e}");
        std::io::Error::other(e)
    })?;
    let hub = Arc::new(SignalingHub::new(gateway, config.rooms.clone()));
    let state = AppState::new(hub, config.api.clone());

    let listener = TcpListener::bind(config.listen_addr).await?;

    info!("{} listening on {}", APP_NAME, config.listen_addr);
    info!(
        gateway = %config.gateway.base_url,
        timeout = %humantime::format_duration(config.gateway.request_timeout),
        recording = config.rooms.record,
        "gateway configured"
    );

    serve(listener, state, async {
        if let Err(e) = signal::ctrl_c().await {
            error!("cannot listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
        info!("{} shutting down", APP_NAME);
    })
    .await
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
