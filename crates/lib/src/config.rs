//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.lingo/config.json`) and environment.
//! Secrets (LINE channel token/secret, Papago client id/secret) may come from either;
//! environment wins so deployments can keep them out of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fallback reply sent when the translation service cannot translate a message.
pub const DEFAULT_FALLBACK_TEXT: &str = "번역할 수 없는 언어입니다.";

const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
const DEFAULT_DETECT_URL: &str = "https://openapi.naver.com/v1/papago/detectLangs";
const DEFAULT_TRANSLATE_URL: &str = "https://openapi.naver.com/v1/papago/n2mt";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Channel settings (LINE).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Papago detection and translation endpoints and credentials.
    #[serde(default)]
    pub papago: PapagoConfig,

    /// Reply behaviour.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook and health check (default 3000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub line: LineChannelConfig,
}

/// LINE Messaging API channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChannelConfig {
    /// Long-lived channel access token. Overridden by LINE_CHANNEL_ACCESS_TOKEN env when set.
    pub channel_access_token: Option<String>,
    /// Channel secret used to verify X-Line-Signature. Overridden by LINE_CHANNEL_SECRET env when set.
    pub channel_secret: Option<String>,
    /// Messaging API base URL (default https://api.line.me).
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

fn default_line_api_base() -> String {
    DEFAULT_LINE_API_BASE.to_string()
}

impl Default for LineChannelConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: default_line_api_base(),
        }
    }
}

/// Papago (Naver) API config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PapagoConfig {
    /// Overridden by NAVER_CLIENT_ID env when set.
    pub client_id: Option<String>,
    /// Overridden by NAVER_CLIENT_SECRET env when set.
    pub client_secret: Option<String>,
    #[serde(default = "default_detect_url")]
    pub detect_url: String,
    #[serde(default = "default_translate_url")]
    pub translate_url: String,
    /// Per-request timeout for detection and translation calls. No timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_detect_url() -> String {
    DEFAULT_DETECT_URL.to_string()
}

fn default_translate_url() -> String {
    DEFAULT_TRANSLATE_URL.to_string()
}

impl Default for PapagoConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            detect_url: default_detect_url(),
            translate_url: default_translate_url(),
            timeout_secs: None,
        }
    }
}

/// Reply text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// Text replied when translation fails (default "번역할 수 없는 언어입니다.").
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            fallback_text: default_fallback_text(),
        }
    }
}

/// Env var wins over the config value; both are trimmed and empty means unset.
fn resolve_secret(env_key: &str, configured: Option<&String>) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the LINE channel access token: env LINE_CHANNEL_ACCESS_TOKEN overrides config.
pub fn resolve_line_access_token(config: &Config) -> Option<String> {
    resolve_secret(
        "LINE_CHANNEL_ACCESS_TOKEN",
        config.channels.line.channel_access_token.as_ref(),
    )
}

/// Resolve the LINE channel secret: env LINE_CHANNEL_SECRET overrides config.
pub fn resolve_line_channel_secret(config: &Config) -> Option<String> {
    resolve_secret(
        "LINE_CHANNEL_SECRET",
        config.channels.line.channel_secret.as_ref(),
    )
}

/// Papago client id and secret. Both must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PapagoCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Resolve Papago credentials: env NAVER_CLIENT_ID / NAVER_CLIENT_SECRET override config.
pub fn resolve_papago_credentials(config: &Config) -> Option<PapagoCredentials> {
    let client_id = resolve_secret("NAVER_CLIENT_ID", config.papago.client_id.as_ref())?;
    let client_secret =
        resolve_secret("NAVER_CLIENT_SECRET", config.papago.client_secret.as_ref())?;
    Some(PapagoCredentials {
        client_id,
        client_secret,
    })
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("LINGO_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".lingo").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or LINGO_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
