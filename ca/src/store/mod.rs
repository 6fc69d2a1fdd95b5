//! Analysis persistence
//!
//! The store is a collaborator, not part of the core: the queue and
//! analyzer only need the small contract below. [`MemoryStore`] is the
//! in-process reference implementation used by tests and the CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{AnalysisRecord, Rating};

mod memory;

pub use memory::MemoryStore;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Sort order for paged queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recent analyses first
    #[default]
    Newest,
    Oldest,
}

/// Predicates for a paged record query
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Filter on the verdict rating
    pub rating: Option<Rating>,

    /// Lower bound on analysis time (inclusive)
    pub since: Option<DateTime<Utc>>,

    /// Upper bound on analysis time (exclusive)
    pub until: Option<DateTime<Utc>>,

    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            rating: None,
            since: None,
            until: None,
            order: SortOrder::Newest,
            offset: 0,
            limit: 20,
        }
    }
}

impl RecordQuery {
    /// Whether a record passes this query's filter predicates
    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        if let Some(rating) = self.rating {
            if record.assessment.verdict.rating != rating {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.created_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.created_at >= until {
                return false;
            }
        }
        true
    }
}

/// Persistence contract the analysis executor depends on
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Look up a persisted analysis by normalized channel name
    async fn find_by_channel(&self, channel_name: &str) -> Result<Option<AnalysisRecord>, StoreError>;

    /// Persist a new analysis record
    async fn insert(&self, record: AnalysisRecord) -> Result<AnalysisRecord, StoreError>;

    /// Filtered, ordered page of records plus the total matching count
    async fn query_page(&self, query: RecordQuery) -> Result<(Vec<AnalysisRecord>, usize), StoreError>;
}
