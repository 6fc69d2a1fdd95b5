//! Assessment verdict schema
//!
//! The fixed JSON shape the external assessment service must return. Field
//! names are camelCase on the wire to match the response contract; parsing is
//! strict - a response that does not conform is a hard failure, because
//! downstream reporting assumes this shape.

use serde::{Deserialize, Serialize};

/// Categorical trust rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Legit,
    Doubtful,
    #[serde(rename = "Scam Risk")]
    ScamRisk,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legit => write!(f, "Legit"),
            Self::Doubtful => write!(f, "Doubtful"),
            Self::ScamRisk => write!(f, "Scam Risk"),
        }
    }
}

/// Profile-level checks: bio, links, contactability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCheck {
    pub bio_consistency: String,
    pub external_links: String,
    pub owner_contact: String,
    pub score: i32,
}

/// Engagement numbers the assessment derived from the recent posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub subscriber_count: u64,
    pub avg_views_per_post: f64,
    pub engagement_ratio: String,
    pub avg_comments_per_post: f64,
    pub avg_reactions_per_post: f64,
}

/// Content-level checks: relevance, activity, engagement, scam signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCheck {
    pub relevance: String,
    pub activity_level: String,
    pub engagement_metrics: EngagementMetrics,
    pub scam_indicators: Vec<String>,
    pub score: i32,
}

/// Cross-reference checks against official sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCheck {
    pub official_references: String,
    pub inconsistencies: Vec<String>,
    pub score: i32,
}

/// Final verdict: numeric trust score plus categorical rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub trust_score: i32,
    pub rating: Rating,
    pub explanation: String,
}

/// The complete structured assessment for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAssessment {
    pub profile_check: ProfileCheck,
    pub content_check: ContentCheck,
    pub cross_check: CrossCheck,
    pub verdict: Verdict,
}
