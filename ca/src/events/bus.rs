//! Event bus - pub/sub for queue progress
//!
//! Built on tokio broadcast channels. The queue emits events, consumers
//! (CLI progress, pollers) subscribe. Emission is fire-and-forget: with no
//! subscribers events are dropped, and a slow subscriber lags rather than
//! blocking the queue.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::Job;

use super::types::QueueEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;

/// Central event bus for queue activity
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: QueueEvent) {
        debug!(event_type = event.event_type(), job_id = event.job_id(), "EventBus::emit");
        // Ignore send errors (no subscribers is OK)
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events emitted after this point
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Create an emitter handle bound to one job
    pub fn emitter_for(&self, job_id: impl Into<String>) -> JobEmitter {
        let job_id = job_id.into();
        debug!(%job_id, "EventBus::emitter_for: creating emitter");
        JobEmitter {
            tx: self.tx.clone(),
            job_id,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Cheap-to-clone handle for emitting events for one job
#[derive(Clone)]
pub struct JobEmitter {
    tx: broadcast::Sender<QueueEvent>,
    job_id: String,
}

impl JobEmitter {
    /// The job ID this emitter is bound to
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    fn emit(&self, event: QueueEvent) {
        let _ = self.tx.send(event);
    }

    /// Emit a full job snapshot
    pub fn job_updated(&self, job: &Job) {
        self.emit(QueueEvent::JobUpdated { job: job.clone() });
    }

    /// Emit a channel success
    pub fn channel_completed(&self, channel: &str) {
        self.emit(QueueEvent::ChannelCompleted {
            job_id: self.job_id.clone(),
            channel: channel.to_string(),
        });
    }

    /// Emit a channel failure
    pub fn channel_failed(&self, channel: &str, error: &str) {
        self.emit(QueueEvent::ChannelFailed {
            job_id: self.job_id.clone(),
            channel: channel.to_string(),
            error: error.to_string(),
        });
    }

    /// Emit job completion
    pub fn job_completed(&self) {
        self.emit(QueueEvent::JobCompleted {
            job_id: self.job_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_emitted_events() {
        let bus = EventBus::with_default_capacity();
        let mut rx = bus.subscribe();

        let emitter = bus.emitter_for("job-1");
        emitter.channel_completed("foo");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "channel_completed");
        assert_eq!(event.job_id(), "job-1");
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::with_default_capacity();
        assert_eq!(bus.subscriber_count(), 0);
        // Must not panic or error
        bus.emitter_for("job-1").job_completed();
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_every_event() {
        let bus = EventBus::with_default_capacity();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emitter_for("job-1").job_completed();

        assert_eq!(a.recv().await.unwrap().job_id(), "job-1");
        assert_eq!(b.recv().await.unwrap().job_id(), "job-1");
    }
}
