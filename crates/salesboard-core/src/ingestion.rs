use tracing::{info, warn};

use crate::error::SeedError;
use crate::feed::FeedSource;
use crate::model::NewSaleRecord;
use crate::repository::TransactionRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The feed answered with an empty array; stored records were left alone.
    NoData,
    Seeded { inserted: u64 },
}

/// Pull the feed and replace the stored records with its contents.
pub async fn seed<R, F>(repository: &R, feed: &F) -> Result<SeedOutcome, SeedError>
where
    R: TransactionRepository + ?Sized,
    F: FeedSource + ?Sized,
{
    let items = feed.fetch().await.map_err(SeedError::Upstream)?;

    if items.is_empty() {
        warn!("Feed returned no items; leaving stored records untouched");
        return Ok(SeedOutcome::NoData);
    }

    let records: Vec<NewSaleRecord> = items.into_iter().map(NewSaleRecord::from).collect();
    let inserted = repository.replace_all(&records).await?;
    info!(inserted, "Seeded sale records from feed");

    Ok(SeedOutcome::Seeded { inserted })
}
