//! chanaudit - Telegram channel trust auditor
//!
//! The core of a service that takes Telegram channel links, fetches channel
//! metadata and recent posts from a rate-limited data API, asks an LLM
//! assessment service for a structured trust verdict, persists the result
//! and tracks batched submissions through an in-memory job queue.
//!
//! # Core Concepts
//!
//! - **One analysis path**: the single-channel request and every channel in
//!   a batch run through the same [`analyzer::Analyzer`], so caching and
//!   error classification never diverge.
//! - **Global rate gate**: all data-API calls share one spacing gate; the
//!   effective throughput ceiling is per process, not per job.
//! - **Jobs fail channel by channel**: a job has no failed state; failures
//!   are recorded on the channel task and the batch keeps moving.
//! - **Best-effort registry**: job state is memory-resident and swept after
//!   completion; nothing survives a restart.
//!
//! # Modules
//!
//! - [`telegram`] - rate-limited, caching data API client
//! - [`assess`] - LLM assessment client and verdict coercion
//! - [`analyzer`] - the shared analysis executor
//! - [`queue`] - batch job queue, scheduler and registry
//! - [`events`] - progress event bus for polling consumers
//! - [`store`] - persistence contract and in-memory reference store
//! - [`config`] - configuration types and loading

pub mod analyzer;
pub mod assess;
pub mod cli;
pub mod config;
pub mod domain;
pub mod events;
pub mod queue;
pub mod store;
pub mod telegram;

// Re-export commonly used types
pub use analyzer::{AnalyzeError, Analyzer, ChannelAnalyzer};
pub use assess::{AssessError, Assessor, DeepSeekClient, create_assessor};
pub use config::{AssessConfig, Config, QueueConfig, TelegramConfig};
pub use domain::{
    AnalysisOutcome, AnalysisRecord, ChannelAssessment, ChannelInfo, ChannelMessage, ChannelTask, Job, JobStatus,
    Rating, TaskStatus,
};
pub use events::{EventBus, QueueEvent};
pub use queue::{BatchError, JobQueue, QueueSnapshot};
pub use store::{AnalysisStore, MemoryStore, RecordQuery, SortOrder, StoreError};
pub use telegram::{ChannelFeed, TelegramClient, TelegramError, extract_channel_name};
