use std::sync::Arc;

use salesboard_core::feed::FeedSource;
use salesboard_core::repository::TransactionRepository;

pub struct AppState {
    repository: Arc<dyn TransactionRepository>,
    feed: Arc<dyn FeedSource>,
}

impl AppState {
    pub fn new(repository: Arc<dyn TransactionRepository>, feed: Arc<dyn FeedSource>) -> Self {
        Self { repository, feed }
    }

    pub fn repository(&self) -> &dyn TransactionRepository {
        self.repository.as_ref()
    }

    pub fn feed(&self) -> &dyn FeedSource {
        self.feed.as_ref()
    }
}
