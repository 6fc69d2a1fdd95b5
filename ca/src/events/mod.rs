//! Queue progress events
//!
//! Pub/sub notifications for UI polling and logging; never part of the
//! queue's control flow.

mod bus;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, JobEmitter};
pub use types::QueueEvent;
