//! Queue event types

use serde::Serialize;

use crate::domain::Job;

/// Fire-and-forget notifications emitted while jobs are processed
///
/// These exist for polling UIs and log consumers; nothing in the core's
/// control flow depends on them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// Any job or channel status change; carries the full job snapshot
    JobUpdated { job: Job },

    /// One channel finished successfully
    ChannelCompleted { job_id: String, channel: String },

    /// One channel failed; the job keeps going
    ChannelFailed {
        job_id: String,
        channel: String,
        error: String,
    },

    /// Every channel in the job reached a terminal state
    JobCompleted { job_id: String },
}

impl QueueEvent {
    /// Event type name for logging and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::JobUpdated { .. } => "job_updated",
            Self::ChannelCompleted { .. } => "channel_completed",
            Self::ChannelFailed { .. } => "channel_failed",
            Self::JobCompleted { .. } => "job_completed",
        }
    }

    /// The job this event belongs to
    pub fn job_id(&self) -> &str {
        match self {
            Self::JobUpdated { job } => &job.id,
            Self::ChannelCompleted { job_id, .. } => job_id,
            Self::ChannelFailed { job_id, .. } => job_id,
            Self::JobCompleted { job_id } => job_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = QueueEvent::ChannelFailed {
            job_id: "job-1".to_string(),
            channel: "foo".to_string(),
            error: "boom".to_string(),
        };
        assert_eq!(event.event_type(), "channel_failed");
        assert_eq!(event.job_id(), "job-1");

        let job = Job::new(vec!["a".to_string()]);
        let id = job.id.clone();
        let event = QueueEvent::JobUpdated { job };
        assert_eq!(event.job_id(), id);
    }
}
