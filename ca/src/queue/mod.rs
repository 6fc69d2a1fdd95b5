//! Batch job queue
//!
//! [`JobQueue`] is the scheduler and registry in one owned component: FIFO
//! admission with bounded job concurrency, sequential paced channels within
//! a job, pending-only cancellation, and hourly garbage collection of old
//! completed jobs.

mod core;

pub use core::{BatchError, JobQueue, QueueSnapshot};
