//! Job queue implementation
//!
//! One `JobQueue` per process owns all job state: a registry of jobs by ID,
//! a FIFO pending queue, and the set of currently admitted jobs. Up to
//! `max_concurrent` jobs run at once; within a job, channels are processed
//! strictly in submission order, one at a time, with a fixed pacing delay
//! between them. Concurrency comes from parallel jobs, never from parallel
//! channels inside a job - the data API's rate gate is global anyway.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Weak};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::analyzer::ChannelAnalyzer;
use crate::config::QueueConfig;
use crate::domain::{Job, JobStatus, TaskStatus};
use crate::events::{EventBus, QueueEvent};

/// Batch validation errors, raised before any Job is created
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("At least one channel link is required")]
    Empty,

    #[error("Maximum {max} channels allowed per batch (got {got})")]
    TooLarge { max: usize, got: usize },
}

/// Point-in-time view of the queue for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    /// Jobs waiting for admission
    pub pending_count: usize,

    /// Jobs currently being processed
    pub active_jobs: Vec<Job>,

    /// Whether any job is being processed right now
    pub is_processing: bool,
}

/// Registry state guarded by one mutex
#[derive(Default)]
struct QueueState {
    /// Every known job, pending through completed (until swept)
    jobs: HashMap<String, Job>,

    /// Submission-ordered IDs of jobs not yet admitted
    pending: VecDeque<String>,

    /// IDs of jobs currently admitted
    active: HashSet<String>,
}

struct Inner {
    config: QueueConfig,
    analyzer: Arc<dyn ChannelAnalyzer>,
    bus: EventBus,
    state: Mutex<QueueState>,
}

/// Batch job queue with bounded concurrency
///
/// In-memory and best-effort by design: nothing survives a process restart.
pub struct JobQueue {
    inner: Arc<Inner>,
}

impl JobQueue {
    /// Create a queue and start its background sweeper
    ///
    /// The sweeper holds only a weak reference, so dropping the queue stops
    /// it on its next tick.
    pub fn new(config: QueueConfig, analyzer: Arc<dyn ChannelAnalyzer>) -> Self {
        let sweep_interval = config.sweep_interval();
        let inner = Arc::new(Inner {
            config,
            analyzer,
            bus: EventBus::with_default_capacity(),
            state: Mutex::new(QueueState::default()),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await; // consume the immediate first tick
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let removed = inner.sweep().await;
                if removed > 0 {
                    info!(removed, "sweeper: removed old completed jobs");
                }
            }
            debug!("sweeper: queue dropped, stopping");
        });

        Self { inner }
    }

    /// Submit a batch of channel links as one job
    ///
    /// Validates the batch size, trims and deduplicates links preserving
    /// first-occurrence order, then enqueues the job and tries to admit it.
    pub async fn submit_batch(&self, links: &[String]) -> Result<String, BatchError> {
        if links.is_empty() {
            return Err(BatchError::Empty);
        }
        if links.len() > self.inner.config.max_batch {
            return Err(BatchError::TooLarge {
                max: self.inner.config.max_batch,
                got: links.len(),
            });
        }

        let mut seen = HashSet::new();
        let unique: Vec<String> = links
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && seen.insert(l.clone()))
            .collect();

        if unique.is_empty() {
            return Err(BatchError::Empty);
        }

        let job = Job::new(unique);
        let job_id = job.id.clone();
        info!(%job_id, total = job.total, "submit_batch: job enqueued");

        {
            let mut state = self.inner.state.lock().await;
            state.pending.push_back(job_id.clone());
            state.jobs.insert(job_id.clone(), job);
        }

        Arc::clone(&self.inner).pump().await;

        Ok(job_id)
    }

    /// Look up a job by ID
    pub async fn job(&self, job_id: &str) -> Option<Job> {
        self.inner.state.lock().await.jobs.get(job_id).cloned()
    }

    /// All currently admitted jobs
    pub async fn active_jobs(&self) -> Vec<Job> {
        let state = self.inner.state.lock().await;
        state
            .active
            .iter()
            .filter_map(|id| state.jobs.get(id))
            .cloned()
            .collect()
    }

    /// Point-in-time queue view
    pub async fn snapshot(&self) -> QueueSnapshot {
        let state = self.inner.state.lock().await;
        let active_jobs: Vec<Job> = state
            .active
            .iter()
            .filter_map(|id| state.jobs.get(id))
            .cloned()
            .collect();
        QueueSnapshot {
            pending_count: state.pending.len(),
            is_processing: !active_jobs.is_empty(),
            active_jobs,
        }
    }

    /// Cancel a still-pending job
    ///
    /// Only jobs not yet admitted can be cancelled; a processing or
    /// completed job reports failure and keeps running. Cancellation removes
    /// the job from both the pending queue and the registry.
    pub async fn cancel(&self, job_id: &str) -> bool {
        let mut state = self.inner.state.lock().await;
        match state.jobs.get(job_id) {
            Some(job) if job.status == JobStatus::Pending => {
                state.pending.retain(|id| id != job_id);
                state.jobs.remove(job_id);
                info!(%job_id, "cancel: pending job removed");
                true
            }
            Some(job) => {
                debug!(%job_id, status = %job.status, "cancel: job not pending, refusing");
                false
            }
            None => {
                debug!(%job_id, "cancel: job not found");
                false
            }
        }
    }

    /// Remove completed jobs older than the configured retention
    ///
    /// Also runs hourly in the background; exposed for direct invocation.
    pub async fn sweep(&self) -> usize {
        self.inner.sweep().await
    }

    /// Subscribe to queue progress events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<QueueEvent> {
        self.inner.bus.subscribe()
    }
}

impl Inner {
    /// Admit pending jobs while capacity allows, FIFO
    ///
    /// Called on submission and whenever a job completes.
    //
    // Returns a boxed `dyn Future + Send` rather than being an `async fn`:
    // `run_job` awaits `pump`, and `pump` spawns `run_job`, so an opaque
    // `async fn` future would form an auto-trait inference cycle that leaves
    // the future `!Send`. Boxing gives the future an explicit `Send` bound,
    // breaking the cycle without changing behavior.
    fn pump(self: Arc<Self>) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        Box::pin(async move {
            let mut admitted: Vec<(String, Job)> = Vec::new();
            {
                let mut state = self.state.lock().await;
                let state = &mut *state;
                while state.active.len() < self.config.max_concurrent {
                    let Some(job_id) = state.pending.pop_front() else { break };
                    if let Some(job) = state.jobs.get_mut(&job_id) {
                        job.status = JobStatus::Processing;
                        admitted.push((job_id.clone(), job.clone()));
                        state.active.insert(job_id);
                    }
                }
            }

            for (job_id, snapshot) in admitted {
                debug!(%job_id, "pump: admitting job");
                self.bus.emitter_for(&job_id).job_updated(&snapshot);
                let inner = Arc::clone(&self);
                tokio::spawn(async move { inner.run_job(job_id).await });
            }
        })
    }

    /// Drive one job's channels to completion, in order
    async fn run_job(self: Arc<Self>, job_id: String) {
        let emitter = self.bus.emitter_for(&job_id);

        let total = {
            let state = self.state.lock().await;
            match state.jobs.get(&job_id) {
                Some(job) => job.channels.len(),
                None => {
                    warn!(%job_id, "run_job: job vanished before start");
                    return;
                }
            }
        };

        for index in 0..total {
            let link = {
                let mut state = self.state.lock().await;
                let Some(job) = state.jobs.get_mut(&job_id) else {
                    warn!(%job_id, "run_job: job vanished mid-flight");
                    return;
                };
                job.channels[index].status = TaskStatus::Processing;
                let link = job.channels[index].link.clone();
                emitter.job_updated(job);
                link
            };

            debug!(%job_id, %link, index, "run_job: processing channel");
            let result = self.analyzer.analyze(&link).await;

            {
                let mut state = self.state.lock().await;
                if let Some(job) = state.jobs.get_mut(&job_id) {
                    match result {
                        Ok(outcome) => {
                            job.channels[index].status = TaskStatus::Completed;
                            job.channels[index].result = Some(outcome);
                            job.completed += 1;
                            emitter.job_updated(job);
                            emitter.channel_completed(&link);
                        }
                        Err(e) => {
                            warn!(%job_id, %link, error = %e, "run_job: channel failed");
                            job.channels[index].status = TaskStatus::Failed;
                            job.channels[index].error = Some(e.to_string());
                            job.completed += 1;
                            emitter.job_updated(job);
                            emitter.channel_failed(&link, &e.to_string());
                        }
                    }
                }
            }

            // Pacing applies even on cache hits: the aggregate upstream rate
            // stays bounded no matter how the analyses resolve.
            tokio::time::sleep(self.config.channel_delay()).await;
        }

        {
            let mut state = self.state.lock().await;
            state.active.remove(&job_id);
            if let Some(job) = state.jobs.get_mut(&job_id) {
                job.status = JobStatus::Completed;
                info!(%job_id, completed = job.completed, total = job.total, "run_job: job completed");
                emitter.job_updated(job);
                emitter.job_completed();
            }
        }

        // A slot opened: admit the next pending job, if any
        self.pump().await;
    }

    /// Drop completed jobs older than the retention window
    async fn sweep(&self) -> usize {
        let cutoff = Utc::now() - self.config.completed_ttl();
        let mut state = self.state.lock().await;
        let before = state.jobs.len();
        state
            .jobs
            .retain(|_, job| !(job.status == JobStatus::Completed && job.created_at < cutoff));
        before - state.jobs.len()
    }
}
