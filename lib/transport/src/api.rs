//! Chat transport seam and Telegram Bot API client.

use crate::error::TransportError;
use crate::update::TelegramUpdate;
use async_trait::async_trait;
use gemini_relay_core::ChatId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Maximum characters the Bot API accepts in one outbound message.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Trait for chat transports.
///
/// All methods are per-call stateless; receive state (the polling
/// offset) is owned by the caller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a text message to a chat.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;

    /// Signals a "typing" indicator to a chat. Best-effort.
    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError>;

    /// Long-polls for updates with identifiers at or above `offset`.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, TransportError>;

    /// Registers `url` as the webhook callback for pushed updates.
    async fn set_webhook(&self, url: &str) -> Result<(), TransportError>;

    /// Removes the registered webhook, if any.
    async fn delete_webhook(&self) -> Result<(), TransportError>;
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageParams<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SendChatActionParams {
    chat_id: i64,
    action: &'static str,
}

#[derive(Debug, Serialize)]
struct GetUpdatesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct SetWebhookParams<'a> {
    url: &'a str,
}

/// Telegram Bot API implementation of [`ChatTransport`].
#[derive(Debug, Clone)]
pub struct TelegramApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramApi {
    /// Creates a client for the hosted Bot API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, "https://api.telegram.org")
    }

    /// Creates a client against an alternative API host.
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<P: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<T, TransportError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                reason: e.to_string(),
            })?;

        let envelope: ApiEnvelope<T> =
            response
                .json()
                .await
                .map_err(|e| TransportError::PayloadInvalid {
                    reason: e.to_string(),
                })?;

        if !envelope.ok {
            return Err(TransportError::ApiRejected {
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope.result.ok_or_else(|| TransportError::PayloadInvalid {
            reason: format!("{method} returned ok without a result"),
        })
    }
}

#[async_trait]
impl ChatTransport for TelegramApi {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        let params = SendMessageParams {
            chat_id: chat_id.as_i64(),
            text,
        };
        self.call::<_, serde_json::Value>("sendMessage", &params)
            .await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError> {
        let params = SendChatActionParams {
            chat_id: chat_id.as_i64(),
            action: "typing",
        };
        self.call::<_, bool>("sendChatAction", &params).await?;
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, TransportError> {
        let params = GetUpdatesParams {
            offset,
            timeout: timeout_secs,
        };
        self.call("getUpdates", &params).await
    }

    async fn set_webhook(&self, url: &str) -> Result<(), TransportError> {
        let params = SetWebhookParams { url };
        self.call::<_, bool>("setWebhook", &params).await?;
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<(), TransportError> {
        self.call::<_, bool>("deleteWebhook", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
