use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use salesboard_core::error::ParamError;
use salesboard_core::filter::Month;
use salesboard_core::ingestion::{self, SeedOutcome};
use salesboard_core::model::SaleRecord;
use salesboard_core::reports::{self, BarChart, CombinedReport, PieChart, SalesStatistics};
use salesboard_core::repository::TransactionRepository;
use tracing::{debug, info};

use super::envelope::Envelope;
use super::error::ApiError;
use super::params::{ListParams, MonthParams};
use super::state::AppState;

type MonthQuery = Result<Query<MonthParams>, QueryRejection>;
type ApiResult<T> = Result<Envelope<T>, ApiError>;

fn month_from(params: MonthQuery) -> Result<Month, ParamError> {
    let Query(params) = params.map_err(|rejection| ParamError::Malformed(rejection.body_text()))?;
    params.month()
}

pub async fn banner() -> &'static str {
    "Salesboard server is running"
}

pub async fn seed_data(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    let outcome = ingestion::seed(state.repository(), state.feed()).await?;
    info!(?outcome, "seed request finished");

    Ok(match outcome {
        SeedOutcome::NoData => Envelope::message("Data Not Found In Third Party Url"),
        SeedOutcome::Seeded { .. } => Envelope::message("Data Seeded Successfully"),
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<SaleRecord>> {
    let Query(params) = params.map_err(|rejection| ParamError::Malformed(rejection.body_text()))?;
    let query = params.into_query()?;

    let records = state.repository().list(&query).await?;
    debug!(
        month = %query.month,
        page = query.pagination.page(),
        returned = records.len(),
        "listed sale records"
    );
    Ok(Envelope::success("List Fetched Successfully", records))
}

pub async fn statistics(
    State(state): State<Arc<AppState>>,
    params: MonthQuery,
) -> ApiResult<SalesStatistics> {
    let month = month_from(params)?;
    let stats = reports::statistics(state.repository(), month).await?;
    Ok(Envelope::success("Statistics Fetched Successfully", stats))
}

pub async fn bar_chart(State(state): State<Arc<AppState>>, params: MonthQuery) -> ApiResult<BarChart> {
    let month = month_from(params)?;
    let chart = reports::bar_chart(state.repository(), month).await?;
    Ok(Envelope::success("Bar Chart Data Fetched Successfully", chart))
}

pub async fn pie_chart(State(state): State<Arc<AppState>>, params: MonthQuery) -> ApiResult<PieChart> {
    let month = month_from(params)?;
    let chart = reports::pie_chart(state.repository(), month).await?;
    Ok(Envelope::success("Pie Chart Data Fetched Successfully", chart))
}

pub async fn combined(
    State(state): State<Arc<AppState>>,
    params: MonthQuery,
) -> ApiResult<CombinedReport> {
    let month = month_from(params)?;
    let report = reports::combined(state.repository(), month).await?;
    Ok(Envelope::success("Combined Data Fetched Successfully", report))
}
