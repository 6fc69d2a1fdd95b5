//! DeepSeek assessment client
//!
//! Implements the Assessor trait over DeepSeek's OpenAI-compatible Chat
//! Completions API. Transient failures (5xx, network) are retried within a
//! small budget; 429 surfaces as a rate-limit error immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AssessConfig;
use crate::domain::{ChannelAssessment, ChannelInfo, ChannelMessage};

use super::client::Assessor;
use super::error::AssessError;
use super::prompt::{SYSTEM_PROMPT, build_analysis_prompt};
use super::verdict::parse_assessment;

/// Retry hint when the upstream gave no Retry-After header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// DeepSeek Chat Completions client
pub struct DeepSeekClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    retry_delay: Duration,
}

impl DeepSeekClient {
    /// Create a client from configuration
    ///
    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &AssessConfig) -> Result<Self, AssessError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| AssessError::Config(format!("{} not set", config.api_key_env)))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AssessError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// Build the chat-completions request body
    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    /// Send the completion request with the transient-retry loop
    async fn complete(&self, prompt: &str) -> Result<String, AssessError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(prompt);

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_delay * 2u32.pow(attempt - 1);
                warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "complete: retrying after transient error"
                );
                tokio::time::sleep(backoff).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "complete: network error");
                    last_error = Some(AssessError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("complete: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

                return Err(AssessError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if status >= 500 && attempt < self.max_retries {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "complete: retryable error");
                last_error = Some(AssessError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(AssessError::ApiError { status, message: text });
            }

            let api_response: CompletionResponse = response
                .json()
                .await
                .map_err(|e| AssessError::MalformedVerdict(e.to_string()))?;
            return extract_content(api_response);
        }

        Err(last_error.unwrap_or_else(|| AssessError::MalformedVerdict("Max retries exceeded".to_string())))
    }
}

/// Pull the completion text out of the response envelope
fn extract_content(response: CompletionResponse) -> Result<String, AssessError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| AssessError::MalformedVerdict("empty completion".to_string()))
}

#[async_trait]
impl Assessor for DeepSeekClient {
    async fn assess(
        &self,
        info: &ChannelInfo,
        messages: &[ChannelMessage],
    ) -> Result<ChannelAssessment, AssessError> {
        debug!(channel = %info.title, message_count = messages.len(), "assess: called");
        let prompt = build_analysis_prompt(info, messages);
        let text = self.complete(&prompt).await?;
        parse_assessment(&text)
    }
}

// === Response envelope ===

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
