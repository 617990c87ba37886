//! Reasoning gateway.
//!
//! A thin client for an OpenAI-compatible chat completions endpoint. The
//! prompts and response schemas live in `pulse_core::analysis`; this module
//! only moves strings across the wire.

use pulse_core::{PulseError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Default completion endpoint base URL.
pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1";
/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Request timeout; completions are slower than tracker queries.
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Sampling temperature for narrative analysis.
const NARRATIVE_TEMPERATURE: f64 = 0.7;
/// Sampling temperature for structured JSON analysis.
const STRUCTURED_TEMPERATURE: f64 = 0.3;

/// Future type returned by reasoning gateway methods.
pub type ReasoningFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Configuration for the reasoning gateway, passed in explicitly.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the completion endpoint.
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model name.
    pub model: String,
}

/// Completion operations consumed by analysis commands.
pub trait ReasoningGateway: Send + Sync {
    /// Run one completion. When `json_response` is set the endpoint is asked
    /// for a JSON object and sampled at a lower temperature.
    fn complete<'a>(
        &'a self,
        system_prompt: &'a str,
        user_payload: &'a str,
        json_response: bool,
    ) -> ReasoningFuture<'a, String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Reqwest-backed reasoning gateway.
pub struct OpenAiGateway {
    client: Client,
    config: LlmConfig,
}

impl OpenAiGateway {
    /// Build a gateway from explicit configuration.
    #[cfg_attr(test, allow(dead_code))]
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pulse-cli")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| PulseError::Gateway(err.to_string()))?;
        Ok(Self { client, config })
    }

    async fn chat(
        &self,
        system_prompt: &str,
        user_payload: &str,
        json_response: bool,
    ) -> Result<String> {
        log::debug!(
            "completion request: model={} json={json_response}",
            self.config.model
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_payload,
                },
            ],
            temperature: if json_response {
                STRUCTURED_TEMPERATURE
            } else {
                NARRATIVE_TEMPERATURE
            },
            response_format: json_response.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| PulseError::Gateway(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::Gateway(format!(
                "completion endpoint returned {status}: {body}"
            )));
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|err| PulseError::Gateway(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PulseError::Gateway("completion response had no content".to_string()))
    }
}

impl ReasoningGateway for OpenAiGateway {
    fn complete<'a>(
        &'a self,
        system_prompt: &'a str,
        user_payload: &'a str,
        json_response: bool,
    ) -> ReasoningFuture<'a, String> {
        Box::pin(self.chat(system_prompt, user_payload, json_response))
    }
}
