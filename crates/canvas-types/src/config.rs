//! Application configuration schema (`canvas.toml`).

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `{data_dir}/canvas.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub server: ServerConfig,
    pub webhook: WebhookSettings,
}

/// REST API bind address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Webhook layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    /// Resolution window for dispatched sessions, milliseconds.
    pub default_timeout_ms: u64,
    /// Bearer token the automation side must present on the inbound
    /// response endpoint. `None` disables the check.
    pub callback_token: Option<String>,
    /// Fallback n8n URL for projects without their own webhook URL.
    pub agent_url: Option<String>,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            callback_token: None,
            agent_url: None,
        }
    }
}
