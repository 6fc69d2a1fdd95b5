//! Assessor trait definition

use async_trait::async_trait;

use crate::domain::{ChannelAssessment, ChannelInfo, ChannelMessage};

use super::error::AssessError;

/// External trust assessment over channel metadata and recent posts
///
/// Implementations must return the fixed verdict schema or fail with
/// [`AssessError::MalformedVerdict`]; there is no silent defaulting, because
/// downstream reporting assumes the shape.
#[async_trait]
pub trait Assessor: Send + Sync {
    /// Assess one channel from its metadata and recent posts
    async fn assess(
        &self,
        info: &ChannelInfo,
        messages: &[ChannelMessage],
    ) -> Result<ChannelAssessment, AssessError>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Canned assessor for analyzer and queue tests

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{ContentCheck, CrossCheck, EngagementMetrics, ProfileCheck, Rating, Verdict};

    /// Build a plausible assessment for tests
    pub fn sample_assessment(rating: Rating) -> ChannelAssessment {
        ChannelAssessment {
            profile_check: ProfileCheck {
                bio_consistency: "clear".to_string(),
                external_links: "official".to_string(),
                owner_contact: "present".to_string(),
                score: 8,
            },
            content_check: ContentCheck {
                relevance: "crypto-related".to_string(),
                activity_level: "active".to_string(),
                engagement_metrics: EngagementMetrics {
                    subscriber_count: 1_000,
                    avg_views_per_post: 200.0,
                    engagement_ratio: "20.00%".to_string(),
                    avg_comments_per_post: 0.0,
                    avg_reactions_per_post: 0.0,
                },
                scam_indicators: vec![],
                score: 7,
            },
            cross_check: CrossCheck {
                official_references: "yes".to_string(),
                inconsistencies: vec![],
                score: 9,
            },
            verdict: Verdict {
                trust_score: 80,
                rating,
                explanation: "test verdict".to_string(),
            },
        }
    }

    /// Counting assessor that returns a fixed result
    pub struct MockAssessor {
        result: Result<ChannelAssessment, fn() -> AssessError>,
        calls: AtomicUsize,
    }

    impl MockAssessor {
        pub fn ok(rating: Rating) -> Self {
            Self {
                result: Ok(sample_assessment(rating)),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(make_error: fn() -> AssessError) -> Self {
            Self {
                result: Err(make_error),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Assessor for MockAssessor {
        async fn assess(
            &self,
            _info: &ChannelInfo,
            _messages: &[ChannelMessage],
        ) -> Result<ChannelAssessment, AssessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(assessment) => Ok(assessment.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }
}
