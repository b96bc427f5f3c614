use sqlx::migrate::MigrateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed responded with HTTP {0}")]
    Status(u16),

    #[error("feed body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("upstream feed failed: {0}")]
    Upstream(#[source] FeedError),

    #[error("failed to replace stored records: {0}")]
    Store(#[from] RepositoryError),
}

/// Rejections raised while turning raw request parameters into typed queries.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    #[error("month is required")]
    MissingMonth,

    #[error("month must be a number between 1 and 12, got '{0}'")]
    InvalidMonth(String),

    #[error("{name} must be an integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("malformed query string: {0}")]
    Malformed(String),
}
