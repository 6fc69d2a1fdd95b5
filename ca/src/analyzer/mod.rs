//! Analysis executor
//!
//! One shared path for both the single-channel request and every channel
//! task inside a batch: normalize, check the store, fetch, assess, persist.
//! Sharing the executor keeps caching and error classification identical on
//! both paths.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::assess::{AssessError, Assessor};
use crate::domain::{AnalysisOutcome, AnalysisRecord, generate_id};
use crate::store::AnalysisStore;
use crate::telegram::{TelegramClient, extract_channel_name};

/// Recent posts fetched per channel
pub const MESSAGE_FETCH_LIMIT: u32 = 5;

/// Retry hint surfaced to callers when the data API is rate limited
const RATE_LIMIT_RETRY_HINT_SECS: u64 = 60;

/// Warning attached to outcomes that could not be persisted
const SAVE_WARNING: &str = "Analysis completed but not saved to the store";

/// Errors from a single channel analysis
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The link matched no accepted channel-link form; rejected before any external call
    #[error("Invalid Telegram channel link format: {0}")]
    InvalidLink(String),

    /// The data API stayed rate limited past the retry budget
    #[error("Rate limited by the data API, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The data API failed for a non-throttling reason
    #[error("Channel data unavailable: {0}")]
    Unavailable(String),

    /// The assessment service failed or returned a malformed verdict
    #[error("Assessment failed: {0}")]
    Assessment(#[from] AssessError),
}

/// The seam the job queue consumes
///
/// Production code uses [`Analyzer`]; queue tests substitute scripted
/// implementations.
#[async_trait]
pub trait ChannelAnalyzer: Send + Sync {
    /// Analyze one channel link to a single outcome
    async fn analyze(&self, link: &str) -> Result<AnalysisOutcome, AnalyzeError>;
}

/// Production analysis executor
pub struct Analyzer {
    telegram: Arc<TelegramClient>,
    assessor: Arc<dyn Assessor>,
    store: Arc<dyn AnalysisStore>,
}

impl Analyzer {
    pub fn new(telegram: Arc<TelegramClient>, assessor: Arc<dyn Assessor>, store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            telegram,
            assessor,
            store,
        }
    }

    /// Run the full analysis pipeline for one channel link
    pub async fn analyze(&self, link: &str) -> Result<AnalysisOutcome, AnalyzeError> {
        let channel = extract_channel_name(link).map_err(|_| AnalyzeError::InvalidLink(link.to_string()))?;
        debug!(%link, %channel, "analyze: called");

        // An existing record short-circuits everything: no fetch, no assessment
        match self.store.find_by_channel(&channel).await {
            Ok(Some(record)) => {
                debug!(%channel, "analyze: serving persisted analysis");
                return Ok(AnalysisOutcome {
                    success: true,
                    data: record,
                    cached: true,
                    warning: None,
                });
            }
            Ok(None) => {}
            Err(e) => {
                // A store read failure is not fatal; fall through to a fresh analysis
                warn!(%channel, error = %e, "analyze: store lookup failed, analyzing fresh");
            }
        }

        let fetched = tokio::try_join!(
            self.telegram.channel_info(&channel),
            self.telegram.channel_messages(&channel, MESSAGE_FETCH_LIMIT),
        );

        let (info, messages) = match fetched {
            Ok(pair) => pair,
            Err(e) if e.is_rate_limit() => {
                let retry_after_secs = e
                    .retry_after()
                    .map(|d| d.as_secs())
                    .unwrap_or(RATE_LIMIT_RETRY_HINT_SECS);
                return Err(AnalyzeError::RateLimited { retry_after_secs });
            }
            Err(e) => return Err(AnalyzeError::Unavailable(e.to_string())),
        };

        let assessment = self.assessor.assess(&info, &messages).await?;

        let record = AnalysisRecord {
            id: generate_id("analysis"),
            channel_name: channel,
            channel_link: link.to_string(),
            channel_info: info,
            messages,
            assessment,
            created_at: Utc::now(),
        };

        // Computed work is never discarded because storage failed
        match self.store.insert(record.clone()).await {
            Ok(saved) => Ok(AnalysisOutcome {
                success: true,
                data: saved,
                cached: false,
                warning: None,
            }),
            Err(e) => {
                warn!(channel_name = %record.channel_name, error = %e, "analyze: persistence failed");
                Ok(AnalysisOutcome {
                    success: true,
                    data: record,
                    cached: false,
                    warning: Some(SAVE_WARNING.to_string()),
                })
            }
        }
    }
}

#[async_trait]
impl ChannelAnalyzer for Analyzer {
    async fn analyze(&self, link: &str) -> Result<AnalysisOutcome, AnalyzeError> {
        Analyzer::analyze(self, link).await
    }
}
