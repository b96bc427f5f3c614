use axum::response::{IntoResponse, Response};
use salesboard_core::error::{FeedError, ParamError, RepositoryError, SeedError};
use thiserror::Error;
use tracing::{error, warn};

use super::envelope::Envelope;

/// Failures caught at the endpoint boundary. All of them surface to the client
/// as the same generic 500 envelope; the detail only goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("upstream feed failed: {0}")]
    Upstream(#[source] FeedError),

    #[error("query failed: {0}")]
    Query(#[from] RepositoryError),

    #[error("invalid request parameters: {0}")]
    InvalidInput(#[from] ParamError),
}

impl From<SeedError> for ApiError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::Upstream(inner) => ApiError::Upstream(inner),
            SeedError::Store(inner) => ApiError::Query(inner),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidInput(_) => warn!(error = %self, "rejected request"),
            ApiError::Upstream(_) | ApiError::Query(_) => error!(error = %self, "request failed"),
        }
        Envelope::failure().into_response()
    }
}
