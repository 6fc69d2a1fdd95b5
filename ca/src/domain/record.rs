//! Channel data and analysis record types
//!
//! `ChannelInfo` and `ChannelMessage` mirror the upstream data API loosely:
//! fields default when absent and unknown fields are ignored, since the
//! third-party schema is not under our control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::ChannelAssessment;

/// Channel metadata as returned by the upstream data API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChannelInfo {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub subscribers: u64,

    #[serde(default)]
    pub verified: bool,

    #[serde(default)]
    pub chat_type: String,
}

/// Reference to an attached media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MediaRef {
    #[serde(default)]
    pub url: Option<String>,
}

/// A single channel post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: i64,

    pub date: DateTime<Utc>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub video: Option<MediaRef>,

    #[serde(default)]
    pub photo: Option<MediaRef>,
}

impl ChannelMessage {
    /// Whether the post carries a video attachment
    pub fn has_video(&self) -> bool {
        self.video.as_ref().is_some_and(|m| m.url.is_some())
    }

    /// Whether the post carries a photo attachment
    pub fn has_photo(&self) -> bool {
        self.photo.as_ref().is_some_and(|m| m.url.is_some())
    }
}

/// The persisted result of one channel analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique, time-ordered identifier
    pub id: String,

    /// Normalized channel name (cache/store key)
    pub channel_name: String,

    /// The link as originally submitted
    pub channel_link: String,

    /// Channel metadata at analysis time
    pub channel_info: ChannelInfo,

    /// The messages the assessment was based on
    pub messages: Vec<ChannelMessage>,

    /// The structured assessment verdict
    pub assessment: ChannelAssessment,

    /// Analysis time
    pub created_at: DateTime<Utc>,
}

/// Outcome of one analysis, as stored on a ChannelTask
///
/// Immutable once constructed. A persistence failure does not fail the
/// analysis; it surfaces as `warning` on an otherwise successful outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub success: bool,

    /// The analysis record (persisted, or built in-memory when persistence failed)
    pub data: AnalysisRecord,

    /// True when the record was served from the store without external calls
    pub cached: bool,

    /// Set when the analysis succeeded but could not be persisted
    pub warning: Option<String>,
}
