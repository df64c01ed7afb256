use parking_lot::RwLock;
use secrecy::SecretString;
use std::{
    net::SocketAddr,
    sync::{Arc, OnceLock},
};

use super::{
    cli::CliConfig,
    file::{ConfigError, FileConfig, validate_url},
    types::LogLevel,
};
use crate::api::ApiSettings;
use crate::gateway::GatewaySettings;
use crate::rooms::RoomPolicy;

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static ROOT_CONFIG: OnceLock<Arc<RwLock<Config>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- Config ----------------------------------------------------------------

/// Resolved process configuration: CLI/env over config file over defaults.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: LogLevel,
    pub gateway: GatewaySettings,
    pub rooms: RoomPolicy,
    pub api: ApiSettings,
}

// -----------------------------------------------------------------------------
// ----- Config: Static --------------------------------------------------------

impl Config {
    /// Init: panic on any error. Do not start with a bad state.
    pub async fn init() {
        CliConfig::init();

        let next = Self::load()
            .await
            .unwrap_or_else(|e| panic!("invalid configuration: {e}"));

        if ROOT_CONFIG.set(Arc::new(RwLock::new(next))).is_err() {
            panic!("Config::init called twice");
        }
    }

    pub fn snapshot() -> Config {
        Self::handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Private -------------------------------------------------------

impl Config {
    async fn load() -> Result<Config, ConfigError> {
        let cli = CliConfig::snapshot();

        let file = match &cli.config_file_location {
            Some(path) => FileConfig::from_file_async(path).await?,
            None => FileConfig::default(),
        };

        Self::resolve(cli, file)
    }

    fn resolve(cli: CliConfig, file: FileConfig) -> Result<Config, ConfigError> {
        let rooms = file.room_policy();

        let base_url = match cli.gateway_url {
            Some(url) => {
                validate_url("--gateway-url", &url, &["http", "https"])?;
                url
            }
            None => file.gateway.url,
        };

        let api_secret = cli.gateway_secret.or_else(|| {
            file.gateway
                .api_secret
                .filter(|secret| !secret.is_empty())
                .map(|secret| SecretString::new(secret.into_boxed_str()))
        });

        let gateway = GatewaySettings {
            base_url,
            api_secret,
            request_timeout: file.gateway.request_timeout,
            accept_invalid_certs: file.gateway.accept_invalid_certs,
        };

        let api = ApiSettings {
            gateway_url: gateway.base_url.clone(),
            gateway_ws_url: file.gateway.ws_url,
            public_ip: file.api.public_ip,
            session_timeout: file.api.session_timeout,
            recording_enabled: rooms.record,
            recording_dir: rooms.rec_dir.clone(),
            recordings_dir: file.api.recordings_dir,
        };

        Ok(Config {
            listen_addr: cli.listen_addr,
            log_level: cli.log_level,
            gateway,
            rooms,
            api,
        })
    }

    fn handle() -> Arc<RwLock<Config>> {
        ROOT_CONFIG
            .get()
            .expect("Config not initialized; call Config::init().await first")
            .clone()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
