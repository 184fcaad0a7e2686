//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sales::{
    CreateSaleInput, CreateSaleResponse, SaleDetail, SaleFilter, SaleService, SaleStats,
    SaleSummary, SalesPeriod, SetStatusInput, SetStatusResponse,
};
use crate::AppState;

/// Create a sale
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<CreateSaleResponse>> {
    let service = SaleService::new(state.db, state.config.alerts.banding());
    let response = service.create_sale(current_user.0.user_id, input).await?;
    Ok(Json(response))
}

/// List sales with filters and pagination
pub async fn list_sales(
    State(state): State<AppState>,
    Query(filter): Query<SaleFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<SaleSummary>>> {
    let service = SaleService::new(state.db, state.config.alerts.banding());
    let response = service.list_sales(filter, pagination).await?;
    Ok(Json(response))
}

/// Get one sale with its line items
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleDetail>> {
    let service = SaleService::new(state.db, state.config.alerts.banding());
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Transition a sale's status
pub async fn update_sale_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<SetStatusInput>,
) -> AppResult<Json<SetStatusResponse>> {
    let service = SaleService::new(state.db, state.config.alerts.banding());
    let response = service
        .set_status(current_user.0.user_id, sale_id, input)
        .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default = "default_period")]
    pub period: SalesPeriod,
}

fn default_period() -> SalesPeriod {
    SalesPeriod::Month
}

/// Sale statistics over a trailing period
pub async fn get_sale_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<SaleStats>> {
    let service = SaleService::new(state.db, state.config.alerts.banding());
    let stats = service.stats(query.period).await?;
    Ok(Json(stats))
}
