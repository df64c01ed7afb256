use clap::Parser;
use parking_lot::RwLock;
use secrecy::SecretString;
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use super::types::LogLevel;

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static CLI_CONFIG: OnceLock<Arc<RwLock<CliConfig>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- CliConfig -------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub listen_addr: SocketAddr,
    pub config_file_location: Option<PathBuf>,
    pub log_level: LogLevel,
    pub gateway_url: Option<String>,
    pub gateway_secret: Option<SecretString>,
}

impl CliConfig {
    pub fn init() {
        CLI_CONFIG.get_or_init(|| {
            let cfg = Self::from_args();
            cfg.validate();
            Arc::new(RwLock::new(cfg))
        });
    }

    pub fn snapshot() -> CliConfig {
        handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- CliConfig: Private ----------------------------------------------------

impl CliConfig {
    fn from_args() -> Self {
        let args = Args::try_parse().unwrap_or_else(|e| e.exit());
        Self::from_parsed(args)
    }

    fn from_parsed(args: Args) -> Self {
        Self {
            listen_addr: SocketAddr::from((args.host, args.port)),
            config_file_location: args.config_file,
            log_level: args.log_level,
            gateway_url: args.gateway_url.filter(|url| !url.trim().is_empty()),
            gateway_secret: args
                .gateway_secret
                .filter(|secret| !secret.is_empty())
                .map(|secret| SecretString::new(secret.into_boxed_str())),
        }
    }

    fn validate(&self) {
        if let Some(path) = &self.config_file_location {
            must_exist_file(path, "--config / CALLBRIDGE_CONFIG_FILE");
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "callbridge",
    version,
    about = "WebSocket signaling bridge for a Janus video-room gateway"
)]
struct Args {
    // IPv4 or IPv6 literal (e.g., 0.0.0.0, 127.0.0.1, ::, ::1).
    #[arg(long = "host", short = 'H', env = "CALLBRIDGE_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long = "port", short = 'p', env = "PORT", default_value_t = 3000)]
    port: u16,

    // Not required via CLI or ENV (defaults to info).
    #[arg(long = "log", default_value = "info")]
    log_level: LogLevel,

    // Optional; must exist when given.
    #[arg(long = "config", env = "CALLBRIDGE_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    // Overrides [gateway].url from the config file.
    #[arg(long = "gateway-url", env = "JANUS_URL")]
    gateway_url: Option<String>,

    // Overrides [gateway].api_secret from the config file.
    #[arg(long = "gateway-secret", env = "JANUS_API_SECRET", hide_env_values = true)]
    gateway_secret: Option<String>,
}

// -----------------------------------------------------------------------------
// ----- Private Utils ---------------------------------------------------------

fn handle() -> Arc<RwLock<CliConfig>> {
    CLI_CONFIG
        .get()
        .expect("config not initialized; call Config::init().await first")
        .clone()
}

fn must_exist_file(path: &Path, hint: &str) {
    let md = fs::metadata(path).unwrap_or_else(|_| {
        panic!("required file missing: {} (from {hint})", path.display());
    });

    if !md.is_file() {
        panic!("path is not a file: {} (from {hint})", path.display());
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
