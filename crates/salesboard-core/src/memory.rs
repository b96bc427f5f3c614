//! In-process stand-ins for the database and the upstream feed, used by test suites.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{FeedError, RepositoryError};
use crate::feed::{FeedSource, SourceItem};
use crate::filter::{Filter, ListQuery};
use crate::model::{NewSaleRecord, SaleRecord};
use crate::repository::TransactionRepository;

/// Vector-backed repository evaluating filters with [`Filter::matches`].
#[derive(Default)]
pub struct MemoryRepository {
    records: Mutex<Vec<SaleRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<NewSaleRecord>) -> Self {
        let repository = Self::new();
        repository.store(&records);
        repository
    }

    pub fn snapshot(&self) -> Vec<SaleRecord> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SaleRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self, records: &[NewSaleRecord]) -> u64 {
        let created_at = Utc::now();
        let mut stored = self.lock();
        stored.clear();
        stored.extend(
            records
                .iter()
                .cloned()
                .map(|record| record.into_record(Uuid::new_v4(), created_at)),
        );
        stored.len() as u64
    }

    fn matching(&self, filter: &Filter) -> Vec<SaleRecord> {
        self.lock()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TransactionRepository for MemoryRepository {
    async fn replace_all(&self, records: &[NewSaleRecord]) -> Result<u64, RepositoryError> {
        Ok(self.store(records))
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<SaleRecord>, RepositoryError> {
        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);
        Ok(self
            .matching(&query.filter())
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn sum_price(&self, filter: &Filter) -> Result<f64, RepositoryError> {
        Ok(self
            .matching(filter)
            .iter()
            .filter_map(|record| record.price)
            .fold(0.0, |total, price| total + price))
    }

    async fn count(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        Ok(self.matching(filter).len() as i64)
    }

    async fn category_counts(
        &self,
        filter: &Filter,
    ) -> Result<Vec<(Option<String>, i64)>, RepositoryError> {
        let mut counts: Vec<(Option<String>, i64)> = Vec::new();
        for record in self.matching(filter) {
            match counts.iter_mut().find(|(category, _)| *category == record.category) {
                Some((_, count)) => *count += 1,
                None => counts.push((record.category, 1)),
            }
        }
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(counts)
    }
}

/// Feed that always answers with the same items.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    items: Vec<SourceItem>,
}

impl StaticFeed {
    pub fn new(items: Vec<SourceItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> Result<Vec<SourceItem>, FeedError> {
        Ok(self.items.clone())
    }
}

/// Feed that always fails as if the upstream answered with the given HTTP status.
#[derive(Debug, Clone, Copy)]
pub struct FailingFeed {
    pub status: u16,
}

#[async_trait]
impl FeedSource for FailingFeed {
    async fn fetch(&self) -> Result<Vec<SourceItem>, FeedError> {
        Err(FeedError::Status(self.status))
    }
}
