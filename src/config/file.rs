use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::fs;

use crate::rooms::RoomPolicy;

// -----------------------------------------------------------------------------
// ----- Defaults --------------------------------------------------------------

pub const DEFAULT_GATEWAY_URL: &str = "https://localhost:8089/janus";
pub const DEFAULT_GATEWAY_WS_URL: &str = "wss://localhost:8989";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

// -----------------------------------------------------------------------------
// ----- FileConfig ------------------------------------------------------------

/// On-disk TOML layout. Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub rooms: RoomsSection,

    #[serde(default)]
    pub api: ApiSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_gateway_url")]
    pub url: String,

    #[serde(default = "default_gateway_ws_url")]
    pub ws_url: String,

    #[serde(default)]
    pub api_secret: Option<String>,

    #[serde(default = "default_request_timeout", deserialize_with = "de_human_duration")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomsSection {
    pub publishers: Option<u32>,
    pub bitrate: Option<u64>,
    pub bitrate_cap: Option<bool>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub record: Option<bool>,
    pub rec_dir: Option<String>,
    pub transport_wide_cc: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: PathBuf,

    #[serde(default = "default_public_ip")]
    pub public_ip: String,

    #[serde(default = "default_session_timeout", deserialize_with = "de_human_duration")]
    pub session_timeout: Duration,
}

// -----------------------------------------------------------------------------
// ----- FileConfig: Static ----------------------------------------------------

impl FileConfig {
    pub async fn from_file_async(path: &Path) -> Result<FileConfig, ConfigError> {
        let raw = fs::read_to_string(path).await.map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<FileConfig, ConfigError> {
        let doc: FileConfig = toml::from_str(raw).map_err(|e| ConfigError::Toml { source: e })?;
        doc.validate()?;
        Ok(doc)
    }
}

// -----------------------------------------------------------------------------
// ----- FileConfig: Public ----------------------------------------------------

impl FileConfig {
    /// Gateway create defaults with any `[rooms]` overrides applied.
    pub fn room_policy(&self) -> RoomPolicy {
        let defaults = RoomPolicy::default();
        let rooms = &self.rooms;

        RoomPolicy {
            publishers: rooms.publishers.unwrap_or(defaults.publishers),
            bitrate: rooms.bitrate.unwrap_or(defaults.bitrate),
            bitrate_cap: rooms.bitrate_cap.unwrap_or(defaults.bitrate_cap),
            video_codec: rooms.video_codec.clone().unwrap_or(defaults.video_codec),
            audio_codec: rooms.audio_codec.clone().unwrap_or(defaults.audio_codec),
            record: rooms.record.unwrap_or(defaults.record),
            rec_dir: rooms.rec_dir.clone().unwrap_or(defaults.rec_dir),
            transport_wide_cc: rooms.transport_wide_cc.unwrap_or(defaults.transport_wide_cc),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- FileConfig: Private ---------------------------------------------------

impl FileConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("gateway.url", &self.gateway.url, &["http", "https"])?;
        validate_url("gateway.ws_url", &self.gateway.ws_url, &["ws", "wss"])?;

        if self.gateway.request_timeout.is_zero() {
            return Err(ConfigError::InvalidField("gateway.request_timeout".into()));
        }
        if self.rooms.publishers == Some(0) {
            return Err(ConfigError::InvalidField("rooms.publishers".into()));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Section Defaults ------------------------------------------------------

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            ws_url: default_gateway_ws_url(),
            api_secret: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            recordings_dir: default_recordings_dir(),
            public_ip: default_public_ip(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_gateway_ws_url() -> String {
    DEFAULT_GATEWAY_WS_URL.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_recordings_dir() -> PathBuf {
    PathBuf::from("./recordings")
}

fn default_public_ip() -> String {
    "localhost".to_string()
}

fn default_session_timeout() -> Duration {
    DEFAULT_SESSION_TIMEOUT
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

pub(crate) fn validate_url(field: &str, value: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let scheme = value.split_once("://").map(|(scheme, _)| scheme);

    match scheme {
        Some(scheme) if schemes.contains(&scheme) => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Durations are written the human way ("10s", "30m", "1h 30m").
fn de_human_duration<'de, D>(d: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(d)?;
    humantime::parse_duration(raw.trim()).map_err(D::Error::custom)
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid or missing field '{0}'")]
    InvalidField(String),

    #[error("'{field}' is not a usable url: {value}")]
    InvalidUrl { field: String, value: String },

    #[error("read error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn parses_every_section() {
        let toml = r#"
            [gateway]
            url = "http://janus.internal:8088/janus"
            ws_url = "ws://janus.internal:8188"
            api_secret = "janusrocks"
            request_timeout = "2s 500ms"
            accept_invalid_certs = true

            [rooms]
            publishers = 6
            video_codec = "vp8"
            record = true
            rec_dir = "/var/lib/janus/recordings"

            [api]
            recordings_dir = "/srv/recordings"
            public_ip = "203.0.113.7"
            session_timeout = "15m"
        "#;

        let tmp = write_tmp(toml);
        let cfg = FileConfig::from_file_async(tmp.path()).await.unwrap();

        assert_eq!(cfg.gateway.url, "http://janus.internal:8088/janus");
        assert_eq!(cfg.gateway.api_secret.as_deref(), Some("janusrocks"));
        assert_eq!(cfg.gateway.request_timeout, Duration::from_millis(2_500));
        assert!(cfg.gateway.accept_invalid_certs);
        assert_eq!(cfg.api.recordings_dir, PathBuf::from("/srv/recordings"));
        assert_eq!(cfg.api.session_timeout, Duration::from_secs(900));

        let policy = cfg.room_policy();
        assert_eq!(policy.publishers, 6);
        assert_eq!(policy.video_codec, "vp8");
        assert_eq!(policy.audio_codec, "opus");
        assert!(policy.record);
        assert_eq!(policy.rec_dir, "/var/lib/janus/recordings");
    }

    #[test]
    fn empty_file_means_defaults() {
        let cfg = FileConfig::parse("").unwrap();

        assert_eq!(cfg.gateway.url, DEFAULT_GATEWAY_URL);
        assert_eq!(cfg.gateway.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(cfg.gateway.api_secret.is_none());
        assert_eq!(cfg.api.session_timeout, Duration::from_millis(1_800_000));
        assert_eq!(cfg.room_policy(), RoomPolicy::default());
    }

    #[test]
    fn rejects_bad_values() {
        let err = FileConfig::parse("[gateway]\nurl = \"janus:8088\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = FileConfig::parse("[gateway]\nrequest_timeout = \"0s\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField(ref f) if f == "gateway.request_timeout"));

        let err = FileConfig::parse("[gateway]\nrequest_timeout = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));

        let err = FileConfig::parse("[rooms]\nbitrate_kbps = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = FileConfig::from_file_async(Path::new("/definitely/not/here.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
