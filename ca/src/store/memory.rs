//! In-memory analysis store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::AnalysisRecord;

use super::{AnalysisStore, RecordQuery, SortOrder, StoreError};

/// HashMap-backed store keyed by normalized channel name
///
/// One record per channel; inserting again for the same channel replaces
/// the previous record.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn find_by_channel(&self, channel_name: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        debug!(%channel_name, "MemoryStore::find_by_channel: called");
        Ok(self.records.read().await.get(channel_name).cloned())
    }

    async fn insert(&self, record: AnalysisRecord) -> Result<AnalysisRecord, StoreError> {
        debug!(channel_name = %record.channel_name, "MemoryStore::insert: called");
        let mut records = self.records.write().await;
        records.insert(record.channel_name.clone(), record.clone());
        Ok(record)
    }

    async fn query_page(&self, query: RecordQuery) -> Result<(Vec<AnalysisRecord>, usize), StoreError> {
        debug!(?query.rating, query.offset, query.limit, "MemoryStore::query_page: called");
        let records = self.records.read().await;

        let mut matching: Vec<AnalysisRecord> = records.values().filter(|r| query.matches(r)).cloned().collect();

        matching.sort_by(|a, b| match query.order {
            SortOrder::Newest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
        });

        let total = matching.len();
        let page = matching.into_iter().skip(query.offset).take(query.limit).collect();

        Ok((page, total))
    }
}
