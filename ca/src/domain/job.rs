//! Job and ChannelTask types
//!
//! A Job is one batch submission: an ordered list of channel tasks plus
//! progress counters. Jobs move Pending -> Processing -> Completed; there is
//! no job-level Failed state, individual channel failures are recorded on
//! their task and counted toward completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::generate_id;
use super::record::AnalysisOutcome;

/// Status of a single channel within a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for its turn in the job's processing loop
    #[default]
    Pending,
    /// Analysis in flight
    Processing,
    /// Analysis finished with a result
    Completed,
    /// Analysis failed; the error is recorded on the task
    Failed,
}

impl TaskStatus {
    /// Whether the task has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued, not yet admitted into the running set
    #[default]
    Pending,
    /// Admitted; channels are being processed in order
    Processing,
    /// Every channel task reached Completed or Failed
    Completed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One channel's progress and result within a job
///
/// Mutated only by the owning job's processing loop; immutable once its
/// status is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelTask {
    /// The channel link or bare name as submitted (trimmed)
    pub link: String,

    /// Current status
    pub status: TaskStatus,

    /// Outcome, set when status is Completed
    pub result: Option<AnalysisOutcome>,

    /// Error message, set when status is Failed
    pub error: Option<String>,
}

impl ChannelTask {
    /// Create a pending task for a channel link
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// A batch analysis request spanning one or more channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique, time-ordered identifier
    pub id: String,

    /// Channel tasks in submission order
    pub channels: Vec<ChannelTask>,

    /// Current status
    pub status: JobStatus,

    /// Channels that reached a terminal state, success or failure.
    /// Invariant: `0 <= completed <= total`.
    pub completed: u32,

    /// Number of channel tasks in this job
    pub total: u32,

    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a pending job from deduplicated channel links
    pub fn new(links: Vec<String>) -> Self {
        let channels: Vec<ChannelTask> = links.into_iter().map(ChannelTask::new).collect();
        let total = channels.len() as u32;
        Self {
            id: generate_id("job"),
            channels,
            status: JobStatus::Pending,
            completed: 0,
            total,
            created_at: Utc::now(),
        }
    }

    /// Whether every channel task has reached a terminal state
    pub fn all_terminal(&self) -> bool {
        self.channels.iter().all(|c| c.status.is_terminal())
    }
}
