//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables: `TELEGRAM_BOT_TOKEN`, `GEMINI_API_KEY`,
//! `GEMINI_MODEL`, `MAX_OUTPUT_TOKENS`, `TRANSPORT_MODE`,
//! `WEBHOOK_BASE_URL`, `PORT`, `ENVIRONMENT`.

use gemini_relay_transport::TransportMode;
use serde::Deserialize;

/// How inbound updates should enter the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportModeConfig {
    /// Actively poll for updates.
    #[default]
    Polling,
    /// Register a webhook and accept pushed updates.
    Webhook,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Telegram bot credential.
    pub telegram_bot_token: String,

    /// Gemini API credential.
    pub gemini_api_key: String,

    /// Model identifier override.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Cap on generated tokens per reply.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Inbound delivery mode.
    #[serde(default)]
    pub transport_mode: TransportModeConfig,

    /// Public base URL for webhook registration. Required in webhook
    /// mode, unused otherwise.
    #[serde(default)]
    pub webhook_base_url: Option<String>,

    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment label, reported by the health endpoint.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_gemini_model() -> String {
    gemini_relay_ai::gemini::DEFAULT_MODEL.to_string()
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Resolves the controller's transport mode from this config.
    ///
    /// # Errors
    ///
    /// Returns an error if webhook mode is selected without a base
    /// URL. This is surfaced at startup; the process never silently
    /// falls back to polling.
    pub fn transport_mode(&self) -> Result<TransportMode, config::ConfigError> {
        match self.transport_mode {
            TransportModeConfig::Polling => Ok(TransportMode::Polling),
            TransportModeConfig::Webhook => {
                let base = self.webhook_base_url.as_deref().ok_or_else(|| {
                    config::ConfigError::Message(
                        "WEBHOOK_BASE_URL is required in webhook mode".to_string(),
                    )
                })?;
                Ok(TransportMode::Webhook {
                    url: format!(
                        "{}/webhook/{}",
                        base.trim_end_matches('/'),
                        self.telegram_bot_token
                    ),
                })
            }
        }
    }
}
