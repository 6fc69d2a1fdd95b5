//! Integration tests for chanaudit
//!
//! These exercise the real pipeline - TelegramClient, Analyzer, JobQueue,
//! MemoryStore - over scripted feed and assessor implementations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use chanaudit::analyzer::{Analyzer, MESSAGE_FETCH_LIMIT};
use chanaudit::assess::{AssessError, Assessor};
use chanaudit::config::{QueueConfig, TelegramConfig};
use chanaudit::domain::{
    ChannelAssessment, ChannelInfo, ChannelMessage, ContentCheck, CrossCheck, EngagementMetrics, JobStatus,
    ProfileCheck, Rating, TaskStatus, Verdict,
};
use chanaudit::queue::{BatchError, JobQueue};
use chanaudit::store::{AnalysisStore, MemoryStore};
use chanaudit::telegram::{ChannelFeed, TelegramClient, TelegramError};

// =============================================================================
// Scripted collaborators
// =============================================================================

/// Feed with healthy metadata and optionally throttled messages
struct ScriptedFeed {
    throttle_messages: bool,
    info_calls: AtomicUsize,
    messages_calls: AtomicUsize,
}

impl ScriptedFeed {
    fn healthy() -> Arc<Self> {
        Arc::new(Self {
            throttle_messages: false,
            info_calls: AtomicUsize::new(0),
            messages_calls: AtomicUsize::new(0),
        })
    }

    fn throttled_messages() -> Arc<Self> {
        Arc::new(Self {
            throttle_messages: true,
            info_calls: AtomicUsize::new(0),
            messages_calls: AtomicUsize::new(0),
        })
    }

    fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelFeed for ScriptedFeed {
    async fn channel_info(&self, channel: &str) -> Result<ChannelInfo, TelegramError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChannelInfo {
            title: format!("{channel} official"),
            description: "news and updates".to_string(),
            subscribers: 5_000,
            verified: true,
            chat_type: "channel".to_string(),
        })
    }

    async fn channel_messages(
        &self,
        channel: &str,
        limit: u32,
        _max_id: u64,
    ) -> Result<Vec<ChannelMessage>, TelegramError> {
        self.messages_calls.fetch_add(1, Ordering::SeqCst);
        if self.throttle_messages {
            return Err(TelegramError::Throttled { retry_after: None });
        }
        Ok((0..limit)
            .map(|i| ChannelMessage {
                id: i as i64 + 1,
                date: Utc::now(),
                text: format!("update {} from {channel}", i + 1),
                views: 400,
                video: None,
                photo: None,
            })
            .collect())
    }
}

/// Assessor that returns a fixed verdict after an optional delay
struct ScriptedAssessor {
    rating: Rating,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedAssessor {
    fn legit() -> Arc<Self> {
        Arc::new(Self {
            rating: Rating::Legit,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            rating: Rating::Doubtful,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Assessor for ScriptedAssessor {
    async fn assess(
        &self,
        info: &ChannelInfo,
        messages: &[ChannelMessage],
    ) -> Result<ChannelAssessment, AssessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(ChannelAssessment {
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
                    subscriber_count: info.subscribers,
                    avg_views_per_post: 400.0,
                    engagement_ratio: "8.00%".to_string(),
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
                trust_score: 75,
                rating: self.rating,
                explanation: format!("{} posts reviewed", messages.len()),
            },
        })
    }
}

// =============================================================================
// Fixture
// =============================================================================

fn fast_telegram_config() -> TelegramConfig {
    TelegramConfig {
        min_request_interval_ms: 1,
        max_retries: 2,
        retry_delay_ms: 1,
        ..Default::default()
    }
}

fn fast_queue_config() -> QueueConfig {
    QueueConfig {
        channel_delay_ms: 1,
        ..Default::default()
    }
}

struct Pipeline {
    analyzer: Arc<Analyzer>,
    store: Arc<MemoryStore>,
}

fn pipeline(feed: Arc<ScriptedFeed>, assessor: Arc<ScriptedAssessor>) -> Pipeline {
    let telegram = Arc::new(TelegramClient::new(feed, fast_telegram_config()));
    let store = Arc::new(MemoryStore::new());
    let analyzer = Arc::new(Analyzer::new(telegram, assessor, store.clone()));
    Pipeline { analyzer, store }
}

async fn wait_for_completion(queue: &JobQueue, job_id: &str) -> chanaudit::domain::Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(job) = queue.job(job_id).await {
            if job.status == JobStatus::Completed {
                return job;
            }
        }
        assert!(tokio::time::Instant::now() < deadline, "job {job_id} did not complete");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

fn links(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_batch_end_to_end_persists_results() {
    let feed = ScriptedFeed::healthy();
    let assessor = ScriptedAssessor::legit();
    let p = pipeline(feed.clone(), assessor.clone());
    let queue = JobQueue::new(fast_queue_config(), p.analyzer.clone());

    let job_id = queue
        .submit_batch(&links(&["t.me/alpha", "beta"]))
        .await
        .unwrap();
    let job = wait_for_completion(&queue, &job_id).await;

    assert_eq!(job.completed, 2);
    for task in &job.channels {
        assert_eq!(task.status, TaskStatus::Completed);
        let outcome = task.result.as_ref().unwrap();
        assert!(outcome.success);
        assert!(!outcome.cached);
        assert_eq!(outcome.data.assessment.verdict.rating, Rating::Legit);
    }

    // Both channels persisted under their normalized names
    assert!(p.store.find_by_channel("alpha").await.unwrap().is_some());
    assert!(p.store.find_by_channel("beta").await.unwrap().is_some());
    assert_eq!(feed.info_calls(), 2);
    assert_eq!(assessor.calls(), 2);
}

#[tokio::test]
async fn test_resubmitted_batch_served_from_store() {
    let feed = ScriptedFeed::healthy();
    let assessor = ScriptedAssessor::legit();
    let p = pipeline(feed.clone(), assessor.clone());
    let queue = JobQueue::new(fast_queue_config(), p.analyzer.clone());

    let first = queue.submit_batch(&links(&["t.me/alpha"])).await.unwrap();
    wait_for_completion(&queue, &first).await;
    assert_eq!(feed.info_calls(), 1);

    let second = queue.submit_batch(&links(&["alpha"])).await.unwrap();
    let job = wait_for_completion(&queue, &second).await;

    let outcome = job.channels[0].result.as_ref().unwrap();
    assert!(outcome.cached);
    // The rerun cost zero external calls
    assert_eq!(feed.info_calls(), 1);
    assert_eq!(assessor.calls(), 1);
}

#[tokio::test]
async fn test_single_channel_path_shares_executor() {
    let feed = ScriptedFeed::healthy();
    let assessor = ScriptedAssessor::legit();
    let p = pipeline(feed.clone(), assessor.clone());

    let fresh = p.analyzer.analyze("t.me/gamma").await.unwrap();
    assert!(!fresh.cached);
    assert_eq!(fresh.data.channel_name, "gamma");

    let cached = p.analyzer.analyze("https://t.me/gamma").await.unwrap();
    assert!(cached.cached);
    assert_eq!(feed.info_calls(), 1);
}

#[tokio::test]
async fn test_throttled_messages_degrade_to_placeholders() {
    let feed = ScriptedFeed::throttled_messages();
    let assessor = ScriptedAssessor::legit();
    let p = pipeline(feed, assessor);

    let outcome = p.analyzer.analyze("t.me/delta").await.unwrap();

    assert!(outcome.success);
    let messages = &outcome.data.messages;
    assert_eq!(messages.len(), MESSAGE_FETCH_LIMIT as usize);
    // Placeholder posts run one day apart, newest first
    for window in messages.windows(2) {
        assert_eq!(window[0].date - window[1].date, chrono::Duration::days(1));
    }
    assert!(messages.iter().all(|m| !m.has_video() && !m.has_photo()));
    // The degraded analysis still persisted
    assert!(p.store.find_by_channel("delta").await.unwrap().is_some());
}

#[tokio::test]
async fn test_invalid_link_fails_its_channel_only() {
    let p = pipeline(ScriptedFeed::healthy(), ScriptedAssessor::legit());
    let queue = JobQueue::new(fast_queue_config(), p.analyzer.clone());

    let job_id = queue
        .submit_batch(&links(&["t.me/good", "https://example.com/nope"]))
        .await
        .unwrap();
    let job = wait_for_completion(&queue, &job_id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.channels[0].status, TaskStatus::Completed);
    assert_eq!(job.channels[1].status, TaskStatus::Failed);
    assert!(
        job.channels[1]
            .error
            .as_deref()
            .unwrap()
            .contains("Invalid Telegram channel link")
    );
}

#[tokio::test]
async fn test_oversized_batch_rejected_before_any_job() {
    let p = pipeline(ScriptedFeed::healthy(), ScriptedAssessor::legit());
    let queue = JobQueue::new(fast_queue_config(), p.analyzer.clone());

    let too_many: Vec<String> = (0..21).map(|i| format!("chan{i}")).collect();
    let err = queue.submit_batch(&too_many).await.unwrap_err();

    assert_eq!(err, BatchError::TooLarge { max: 20, got: 21 });
    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot.pending_count, 0);
    assert!(snapshot.active_jobs.is_empty());
}

#[tokio::test]
async fn test_job_concurrency_bounded_under_load() {
    let p = pipeline(ScriptedFeed::healthy(), ScriptedAssessor::slow(Duration::from_millis(80)));
    let queue = JobQueue::new(fast_queue_config(), p.analyzer.clone());

    let mut job_ids = Vec::new();
    for name in ["one", "two", "three", "four"] {
        job_ids.push(queue.submit_batch(&links(&[name])).await.unwrap());
    }

    // Sample the running set while work is in flight
    for _ in 0..10 {
        let snapshot = queue.snapshot().await;
        assert!(snapshot.active_jobs.len() <= 2, "too many active jobs");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for job_id in &job_ids {
        let job = wait_for_completion(&queue, job_id).await;
        assert_eq!(job.completed, job.total);
    }
}
