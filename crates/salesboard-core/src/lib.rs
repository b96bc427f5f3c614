pub mod db;
pub mod error;
pub mod feed;
pub mod filter;
pub mod ingestion;
pub mod model;
pub mod reports;
pub mod repository;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
