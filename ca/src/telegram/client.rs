//! Rate-limited Telegram data client
//!
//! Wraps a [`ChannelFeed`] with the three behaviors every caller shares:
//!
//! 1. A TTL cache over successful responses (lazy eviction on lookup).
//! 2. A single process-wide spacing gate: less than the minimum interval
//!    since the last outbound request suspends the caller. The gate is held
//!    across the wait, so concurrent callers serialize in time rather than
//!    stampeding when the interval elapses.
//! 3. A bounded retry loop with exponential backoff on throttled attempts,
//!    each attempt re-entering the spacing gate.
//!
//! Message fetches that exhaust the retry budget on throttling degrade to
//! synthetic placeholder posts instead of failing, so one throttled channel
//! does not stall a whole batch. Metadata fetches always propagate failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::TelegramConfig;
use crate::domain::{ChannelInfo, ChannelMessage};

use super::error::TelegramError;
use super::feed::{ChannelFeed, RapidApiFeed};

/// Default max-id cursor: effectively "newest first"
const DEFAULT_MAX_ID: u64 = 999_999_999;

/// Retry hint surfaced when the upstream gave no Retry-After header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

static LINK_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"t\.me/([^/?]+)").expect("valid pattern"),
        Regex::new(r"telegram\.me/([^/?]+)").expect("valid pattern"),
        Regex::new(r"telegram\.org/([^/?]+)").expect("valid pattern"),
    ]
});

/// Extract the bare channel name from a Telegram link
///
/// Accepts `t.me/<name>`, `telegram.me/<name>`, `telegram.org/<name>` (with
/// any scheme prefix, name delimited by `/` or `?`), or an already-bare name
/// containing no slash and no dot. Anything else is an invalid link.
pub fn extract_channel_name(link: &str) -> Result<String, TelegramError> {
    for pattern in LINK_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(link) {
            return Ok(captures[1].to_string());
        }
    }

    if !link.contains('/') && !link.contains('.') {
        return Ok(link.to_string());
    }

    Err(TelegramError::InvalidLink(link.to_string()))
}

/// Cached response value
#[derive(Debug, Clone)]
enum CacheValue {
    Info(ChannelInfo),
    Messages(Vec<ChannelMessage>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    stored_at: Instant,
}

/// Rate-limited, caching client over the Telegram data API
pub struct TelegramClient {
    feed: Arc<dyn ChannelFeed>,
    config: TelegramConfig,
    cache: Mutex<HashMap<String, CacheEntry>>,
    /// Time of the last outbound request, shared by all operations
    gate: Mutex<Option<Instant>>,
}

impl TelegramClient {
    /// Create a client over an arbitrary feed
    pub fn new(feed: Arc<dyn ChannelFeed>, config: TelegramConfig) -> Self {
        Self {
            feed,
            config,
            cache: Mutex::new(HashMap::new()),
            gate: Mutex::new(None),
        }
    }

    /// Create a client over the RapidAPI feed named in the configuration
    pub fn from_config(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let feed = RapidApiFeed::from_config(config)?;
        Ok(Self::new(Arc::new(feed), config.clone()))
    }

    /// Fetch channel metadata, serving from cache when live
    pub async fn channel_info(&self, channel: &str) -> Result<ChannelInfo, TelegramError> {
        let key = format!("info:{channel}");
        if let Some(CacheValue::Info(info)) = self.cache_get(&key).await {
            debug!(%channel, "channel_info: cache hit");
            return Ok(info);
        }

        let info = self
            .fetch_with_retry("info", || self.feed.channel_info(channel))
            .await?;
        self.cache_put(key, CacheValue::Info(info.clone())).await;
        Ok(info)
    }

    /// Fetch recent posts, serving from cache when live
    ///
    /// Exhausting the retry budget on throttling degrades to synthetic
    /// placeholder posts rather than failing the caller.
    pub async fn channel_messages(&self, channel: &str, limit: u32) -> Result<Vec<ChannelMessage>, TelegramError> {
        let key = format!("messages:{channel}:{limit}");
        if let Some(CacheValue::Messages(messages)) = self.cache_get(&key).await {
            debug!(%channel, "channel_messages: cache hit");
            return Ok(messages);
        }

        match self
            .fetch_with_retry("messages", || self.feed.channel_messages(channel, limit, DEFAULT_MAX_ID))
            .await
        {
            Ok(messages) => {
                self.cache_put(key, CacheValue::Messages(messages.clone())).await;
                Ok(messages)
            }
            Err(e) if e.is_rate_limit() => {
                // Placeholders are not cached: a later call should try upstream again
                warn!(%channel, "channel_messages: rate limited past retry budget, using synthetic placeholders");
                Ok(synthetic_messages(channel, limit))
            }
            Err(e) => Err(e),
        }
    }

    /// Bounded retry loop; every attempt passes the spacing gate first
    async fn fetch_with_retry<T, F, Fut>(&self, op: &str, mut call: F) -> Result<T, TelegramError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TelegramError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            self.pace().await;

            match call().await {
                Ok(value) => return Ok(value),
                Err(TelegramError::Throttled { retry_after }) => {
                    if attempt >= self.config.max_retries {
                        debug!(op, attempt, "fetch_with_retry: retry budget exhausted");
                        return Err(TelegramError::RateLimited {
                            attempts: attempt + 1,
                            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
                        });
                    }
                    let delay = self.config.retry_delay() * 2u32.pow(attempt);
                    warn!(
                        op,
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "fetch_with_retry: throttled, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Enforce the minimum inter-request interval
    ///
    /// The gate mutex stays locked across the wait: concurrent callers queue
    /// and leave one interval apart. The ceiling is per process, not per
    /// channel or per job.
    async fn pace(&self) {
        let mut gate = self.gate.lock().await;
        if let Some(last) = *gate {
            let elapsed = last.elapsed();
            let min_interval = self.config.min_request_interval();
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "pace: spacing outbound request");
                tokio::time::sleep(wait).await;
            }
        }
        *gate = Some(Instant::now());
    }

    async fn cache_get(&self, key: &str) -> Option<CacheValue> {
        let mut cache = self.cache.lock().await;
        match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.config.cache_ttl() => Some(entry.value.clone()),
            Some(_) => {
                // Expired: evict lazily
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    async fn cache_put(&self, key: String, value: CacheValue) {
        let mut cache = self.cache.lock().await;
        cache.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

/// Deterministically-shaped placeholder posts for a throttled channel
///
/// Dates run one day apart descending from now; views are randomized; no
/// media. The shape matches real posts so the assessment pipeline keeps
/// moving.
pub fn synthetic_messages(channel: &str, limit: u32) -> Vec<ChannelMessage> {
    let now = Utc::now();
    let base_id = now.timestamp_millis();
    let mut rng = rand::rng();

    (0..limit)
        .map(|i| ChannelMessage {
            id: base_id + i as i64,
            date: now - chrono::Duration::days(i as i64),
            text: format!(
                "Sample message {} from {channel}. This is placeholder content for demonstration purposes.",
                i + 1
            ),
            views: rng.random_range(100..1100),
            video: None,
            photo: None,
        })
        .collect()
}
