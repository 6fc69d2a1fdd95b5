//! Raw channel data feed
//!
//! `ChannelFeed` is one raw attempt against the upstream data API - no
//! caching, no pacing, no retries. Those concerns live in
//! [`super::client::TelegramClient`], which wraps a feed. The seam exists so
//! the client's cache/gate/retry semantics are testable without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::domain::{ChannelInfo, ChannelMessage};

use super::error::TelegramError;

/// One raw request against the upstream channel data API
#[async_trait]
pub trait ChannelFeed: Send + Sync {
    /// Fetch channel metadata by name
    async fn channel_info(&self, channel: &str) -> Result<ChannelInfo, TelegramError>;

    /// Fetch recent channel posts by name, limit and max-id cursor
    async fn channel_messages(
        &self,
        channel: &str,
        limit: u32,
        max_id: u64,
    ) -> Result<Vec<ChannelMessage>, TelegramError>;
}

/// RapidAPI-hosted Telegram data feed
pub struct RapidApiFeed {
    base_url: String,
    api_host: String,
    api_key: String,
    http: Client,
}

impl RapidApiFeed {
    /// Create a feed from configuration
    ///
    /// Reads the API host and key from the environment variables named in
    /// the config, and builds a reqwest client with the request timeout.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let api_host = std::env::var(&config.api_host_env)
            .map_err(|_| TelegramError::Config(format!("{} not set", config.api_host_env)))?;
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| TelegramError::Config(format!("{} not set", config.api_key_env)))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TelegramError::Request(e.to_string()))?;

        Ok(Self {
            base_url: format!("https://{api_host}"),
            api_host,
            api_key,
            http,
        })
    }

    /// Issue one GET and classify the failure modes
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, TelegramError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "RapidApiFeed::get: sending request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("x-rapidapi-host", &self.api_host)
            .header("x-rapidapi-key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            debug!(%url, ?retry_after, "RapidApiFeed::get: throttled (429)");
            return Err(TelegramError::Throttled { retry_after });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(%url, status = status.as_u16(), "RapidApiFeed::get: error status");
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

/// Split send failures into "sent but no response" vs "could not build request"
fn classify_send_error(e: reqwest::Error) -> TelegramError {
    if e.is_builder() {
        TelegramError::Request(e.to_string())
    } else {
        TelegramError::NoResponse(e.to_string())
    }
}

#[async_trait]
impl ChannelFeed for RapidApiFeed {
    async fn channel_info(&self, channel: &str) -> Result<ChannelInfo, TelegramError> {
        debug!(%channel, "RapidApiFeed::channel_info: called");
        let response = self.get("/channel/info", &[("channel", channel.to_string())]).await?;

        response
            .json::<ChannelInfo>()
            .await
            .map_err(|e| TelegramError::Decode(e.to_string()))
    }

    async fn channel_messages(
        &self,
        channel: &str,
        limit: u32,
        max_id: u64,
    ) -> Result<Vec<ChannelMessage>, TelegramError> {
        debug!(%channel, %limit, %max_id, "RapidApiFeed::channel_messages: called");
        let response = self
            .get(
                "/channel/message",
                &[
                    ("channel", channel.to_string()),
                    ("limit", limit.to_string()),
                    ("max_id", max_id.to_string()),
                ],
            )
            .await?;

        response
            .json::<Vec<ChannelMessage>>()
            .await
            .map_err(|e| TelegramError::Decode(e.to_string()))
    }
}
