//! chanaudit configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main chanaudit configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram data API client configuration
    pub telegram: TelegramConfig,

    /// Assessment service configuration
    pub assessment: AssessConfig,

    /// Batch queue configuration
    pub queue: QueueConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the required API key environment variables are set.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        for var in [
            &self.telegram.api_host_env,
            &self.telegram.api_key_env,
            &self.assessment.api_key_env,
        ] {
            if std::env::var(var).is_err() {
                return Err(eyre::eyre!("Missing credentials. Set the {} environment variable.", var));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .chanaudit.yml
        let local_config = PathBuf::from(".chanaudit.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/chanaudit/chanaudit.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("chanaudit").join("chanaudit.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Telegram data API client configuration
///
/// Interval, retry and TTL values govern the shared rate gate, the bounded
/// retry loop and the response cache in [`crate::telegram::TelegramClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Environment variable containing the API host
    #[serde(rename = "api-host-env")]
    pub api_host_env: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Minimum spacing between outbound requests in milliseconds
    #[serde(rename = "min-request-interval-ms")]
    pub min_request_interval_ms: u64,

    /// Retries after a throttled attempt (total attempts = retries + 1)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds, doubled per attempt
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Cache time-to-live in milliseconds
    #[serde(rename = "cache-ttl-ms")]
    pub cache_ttl_ms: u64,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_host_env: "RAPIDAPI_HOST".to_string(),
            api_key_env: "RAPIDAPI_KEY".to_string(),
            min_request_interval_ms: 1_000,
            max_retries: 3,
            retry_delay_ms: 2_000,
            cache_ttl_ms: 5 * 60 * 1_000,
            timeout_ms: 10_000,
        }
    }
}

impl TelegramConfig {
    /// Minimum inter-request interval as a Duration
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Initial retry backoff as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Cache TTL as a Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Assessment service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Provider name (currently only "deepseek" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries for transient errors
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds, doubled per attempt
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            base_url: "https://api.deepseek.com".to_string(),
            max_tokens: 2_000,
            temperature: 0.3,
            timeout_ms: 30_000,
            max_retries: 2,
            retry_delay_ms: 1_000,
        }
    }
}

impl AssessConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Initial retry backoff as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Batch queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Jobs processed concurrently
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Pacing delay between channels within a job, in milliseconds.
    /// Applied even on cache hits to keep the aggregate upstream rate bounded.
    #[serde(rename = "channel-delay-ms")]
    pub channel_delay_ms: u64,

    /// Maximum channels per submitted batch
    #[serde(rename = "max-batch")]
    pub max_batch: usize,

    /// Age in seconds after which completed jobs are swept from the registry
    #[serde(rename = "completed-ttl-secs")]
    pub completed_ttl_secs: u64,

    /// Interval in seconds between background sweeps
    #[serde(rename = "sweep-interval-secs")]
    pub sweep_interval_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            channel_delay_ms: 500,
            max_batch: 20,
            completed_ttl_secs: 60 * 60,
            sweep_interval_secs: 60 * 60,
        }
    }
}

impl QueueConfig {
    /// Inter-channel pacing delay as a Duration
    pub fn channel_delay(&self) -> Duration {
        Duration::from_millis(self.channel_delay_ms)
    }

    /// Completed-job retention as a chrono duration
    pub fn completed_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.completed_ttl_secs as i64)
    }

    /// Background sweep interval as a Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
