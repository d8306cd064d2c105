//! Gemini backend for the AI responder seam.
//!
//! Talks to the Gemini `generateContent` REST API. Generation settings
//! and safety thresholds are fixed per backend instance; the only
//! per-call inputs are the conversation context and the prompt.

use crate::error::ProviderError;
use crate::responder::{AiResponder, ChatMessage, ChatRole};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used when no override is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key.
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Top-k sampling cutoff.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Cap on generated tokens per reply.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    0.9
}

fn default_top_k() -> u32 {
    1
}

fn default_top_p() -> f32 {
    1.0
}

fn default_max_output_tokens() -> u32 {
    1000
}

impl GeminiConfig {
    /// Creates a configuration with default generation settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// A content block in the Gemini wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

const BLOCK_MEDIUM_AND_ABOVE: &str = "BLOCK_MEDIUM_AND_ABOVE";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini implementation of [`AiResponder`].
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiBackend {
    /// Creates a backend from configuration.
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn build_request(&self, context: &[ChatMessage], prompt: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = context.iter().map(content_from_message).collect();
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        });

        GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: BLOCK_MEDIUM_AND_ABOVE,
                })
                .collect(),
        }
    }
}

fn content_from_message(message: &ChatMessage) -> Content {
    let role = match message.role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    };
    Content {
        role: role.to_string(),
        parts: vec![Part {
            text: message.content.clone(),
        }],
    }
}

/// Maps an HTTP error status to the provider error taxonomy.
fn classify_status(status: StatusCode, retry_after_secs: Option<u64>) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthFailed {
            reason: format!("provider returned {status}"),
        },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after_secs },
        _ => ProviderError::RequestFailed {
            reason: format!("provider returned {status}"),
        },
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| ProviderError::ResponseInvalid {
            reason: "no candidates in response".to_string(),
        })?;

    if text.trim().is_empty() {
        return Err(ProviderError::ResponseInvalid {
            reason: "candidate contained empty text".to_string(),
        });
    }
    Ok(text)
}

#[async_trait]
impl AiResponder for GeminiBackend {
    async fn generate(
        &self,
        context: &[ChatMessage],
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(context, prompt);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            tracing::warn!(status = %status, model = %self.config.model, "Gemini request rejected");
            return Err(classify_status(status, retry_after_secs));
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::ResponseInvalid {
                    reason: e.to_string(),
                })?;

        extract_reply(parsed)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(GeminiConfig::new("test-key", "gemini-test"))
    }

    #[test]
    fn request_appends_prompt_after_context() {
        let context = vec![ChatMessage::user("hello"), ChatMessage::model("hi there")];
        let request = backend().build_request(&context, "how are you?");

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[1].role, "model");
        assert_eq!(request.contents[2].role, "user");
        assert_eq!(request.contents[2].parts[0].text, "how are you?");
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = backend().build_request(&[], "hi");
        let json = serde_json::to_value(&request).expect("serialize");

        assert!(json.get("generationConfig").is_some());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
        assert_eq!(json["safetySettings"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn endpoint_includes_model() {
        let url = backend().endpoint();
        assert!(url.ends_with("/v1beta/models/gemini-test:generateContent"));
    }

    #[test]
    fn classify_auth_statuses() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None),
            ProviderError::AuthFailed { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, None),
            ProviderError::AuthFailed { .. }
        ));
    }

    #[test]
    fn classify_rate_limit_keeps_retry_hint() {
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some(12)),
            ProviderError::RateLimited {
                retry_after_secs: Some(12)
            }
        );
    }

    #[test]
    fn classify_other_statuses_as_request_failure() {
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, None),
            ProviderError::RequestFailed { .. }
        ));
    }

    #[test]
    fn extract_reply_takes_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "hi there"}]}}
            ]
        }))
        .expect("deserialize");

        assert_eq!(extract_reply(response).expect("reply"), "hi there");
    }

    #[test]
    fn extract_reply_rejects_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).expect("deserialize");

        assert!(matches!(
            extract_reply(response),
            Err(ProviderError::ResponseInvalid { .. })
        ));
    }

    #[test]
    fn extract_reply_rejects_blank_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "   "}]}}
            ]
        }))
        .expect("deserialize");

        assert!(matches!(
            extract_reply(response),
            Err(ProviderError::ResponseInvalid { .. })
        ));
    }
}
