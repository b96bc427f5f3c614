//! HTTP surface: every report and listing endpoint lives under `/transactions`.

mod envelope;
mod error;
mod params;
mod routes;
mod state;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

pub use envelope::{Envelope, FAILURE_MESSAGE};
pub use error::ApiError;
pub use params::{ListParams, MonthParams};
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let transactions = Router::new()
        .route("/seed-data", get(routes::seed_data))
        .route("/list", get(routes::list))
        .route("/statistics", get(routes::statistics))
        .route("/barchart", get(routes::bar_chart))
        .route("/piechart", get(routes::pie_chart))
        .route("/commonapi", get(routes::combined));

    Router::new()
        .route("/", get(routes::banner))
        .nest("/transactions", transactions)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
