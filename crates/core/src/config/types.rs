use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub dsm: DsmConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Bot API token issued by BotFather.
    pub bot_token: String,
    /// Chats allowed to submit magnet links. Empty means every chat.
    #[serde(default)]
    pub allowed_chat_ids: Vec<i64>,
}

impl TelegramConfig {
    /// Whether messages from this chat should be handled.
    pub fn is_chat_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chat_ids.is_empty() || self.allowed_chat_ids.contains(&chat_id)
    }
}

/// Synology DSM WebAPI configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DsmConfig {
    /// NAS host name or address (e.g., "192.168.1.10")
    pub host: String,
    #[serde(default = "default_dsm_port")]
    pub port: u16,
    /// DSM account used for both FileStation and DownloadStation sessions
    pub account: String,
    pub password: String,
    /// Timeout for auth and control calls in seconds (default: 10)
    #[serde(default = "default_control_timeout")]
    pub timeout_secs: u32,
    /// Timeout for listing-style calls in seconds (default: 100)
    #[serde(default = "default_listing_timeout")]
    pub listing_timeout_secs: u32,
    /// Query SYNO.API.Info once at startup
    #[serde(default = "default_true")]
    pub probe_on_start: bool,
}

impl DsmConfig {
    /// WebAPI base URL, e.g. `http://nas:5000/webapi`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/webapi", self.host, self.port)
    }
}

fn default_dsm_port() -> u16 {
    5000
}

fn default_control_timeout() -> u32 {
    10
}

fn default_listing_timeout() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

/// Torrent metadata lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_url")]
    pub url: String,
    #[serde(default = "default_control_timeout")]
    pub timeout_secs: u32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: default_metadata_url(),
            timeout_secs: default_control_timeout(),
        }
    }
}

fn default_metadata_url() -> String {
    "https://torrentmeta.fly.dev/".to_string()
}

/// Where dedicated torrent folders are created.
///
/// FileStation addresses shared folders by share name (`/video`) while
/// DownloadStation expects a volume path (`/volume1/video`), so the same
/// location is configured twice.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DestinationConfig {
    #[serde(default = "default_folder_parent")]
    pub folder_parent: String,
    #[serde(default = "default_download_root")]
    pub download_root: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            folder_parent: default_folder_parent(),
            download_root: default_download_root(),
        }
    }
}

fn default_folder_parent() -> String {
    "/video".to_string()
}

fn default_download_root() -> String {
    "/volume1/video".to_string()
}

/// Metrics/health HTTP endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_host")]
    pub host: IpAddr,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_metrics_host(),
            port: default_metrics_port(),
        }
    }
}

fn default_metrics_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_metrics_port() -> u16 {
    9090
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub telegram: SanitizedTelegramConfig,
    pub dsm: SanitizedDsmConfig,
    pub metadata: MetadataConfig,
    pub destination: DestinationConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTelegramConfig {
    pub bot_token_configured: bool,
    pub allowed_chat_ids: Vec<i64>,
}

/// Sanitized DSM config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDsmConfig {
    pub base_url: String,
    pub account: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
    pub listing_timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            telegram: SanitizedTelegramConfig {
                bot_token_configured: !config.telegram.bot_token.is_empty(),
                allowed_chat_ids: config.telegram.allowed_chat_ids.clone(),
            },
            dsm: SanitizedDsmConfig {
                base_url: config.dsm.base_url(),
                account: config.dsm.account.clone(),
                password_configured: !config.dsm.password.is_empty(),
                timeout_secs: config.dsm.timeout_secs,
                listing_timeout_secs: config.dsm.listing_timeout_secs,
            },
            metadata: config.metadata.clone(),
            destination: config.destination.clone(),
            metrics: config.metrics.clone(),
        }
    }
}
