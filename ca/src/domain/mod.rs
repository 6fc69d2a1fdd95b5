//! Domain types for chanaudit
//!
//! Core domain types: Job, ChannelTask, AnalysisOutcome, AnalysisRecord and
//! the assessment verdict schema returned by the external assessment service.

mod assessment;
mod id;
mod job;
mod record;

pub use assessment::{
    ChannelAssessment, ContentCheck, CrossCheck, EngagementMetrics, ProfileCheck, Rating, Verdict,
};
pub use id::generate_id;
pub use job::{ChannelTask, Job, JobStatus, TaskStatus};
pub use record::{AnalysisOutcome, AnalysisRecord, ChannelInfo, ChannelMessage, MediaRef};
