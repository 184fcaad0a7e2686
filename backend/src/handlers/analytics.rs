//! HTTP handlers for analytics endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::analytics::{
    AnalyticsService, DashboardSummary, SalesHistoryPoint, TopProduct,
};
use crate::services::sales::SalesPeriod;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(default = "default_period")]
    pub period: SalesPeriod,
    pub limit: Option<i64>,
}

fn default_period() -> SalesPeriod {
    SalesPeriod::Month
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Daily revenue series over a trailing period
pub async fn get_sales_history(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<SalesHistoryPoint>>> {
    let service = AnalyticsService::new(state.db);
    let points = service.sales_history(query.period).await?;
    Ok(Json(points))
}

/// Best-selling products over a trailing period
pub async fn get_top_products(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<TopProduct>>> {
    let service = AnalyticsService::new(state.db);
    let products = service.top_products(query.period, query.limit).await?;
    Ok(Json(products))
}

/// Headline dashboard figures
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardSummary>> {
    let service = AnalyticsService::new(state.db);
    let summary = service.dashboard().await?;
    Ok(Json(summary))
}

/// Download sales in a date range as CSV
pub async fn export_sales(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let service = AnalyticsService::new(state.db);
    let csv = service
        .export_sales_csv(query.date_from, query.date_to)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales_export.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
