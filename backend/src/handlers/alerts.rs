//! HTTP handlers for stock alert endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::alerts::{AlertRecord, AlertService, AlertSummary};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AlertListQuery {
    pub limit: Option<i64>,
}

/// Pending alerts, highest priority first
pub async fn list_pending_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AlertRecord>>> {
    let service = AlertService::new(state.db);
    let alerts = service.list_pending().await?;
    Ok(Json(alerts))
}

/// Full alert history
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Vec<AlertRecord>>> {
    let service = AlertService::new(state.db);
    let alerts = service.list_all(query.limit).await?;
    Ok(Json(alerts))
}

/// Most recent pending alerts
pub async fn latest_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Vec<AlertRecord>>> {
    let service = AlertService::new(state.db);
    let alerts = service.latest(query.limit).await?;
    Ok(Json(alerts))
}

/// Pending alert counts by priority
pub async fn get_alert_summary(State(state): State<AppState>) -> AppResult<Json<AlertSummary>> {
    let service = AlertService::new(state.db);
    let summary = service.summary().await?;
    Ok(Json(summary))
}

/// Mark a pending alert resolved
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = AlertService::new(state.db);
    service.resolve(alert_id).await?;
    Ok(Json(()))
}

/// Dismiss a pending alert
pub async fn ignore_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = AlertService::new(state.db);
    service.ignore(alert_id).await?;
    Ok(Json(()))
}

#[derive(Debug, Serialize)]
pub struct ResolveForProductResponse {
    pub resolved: u64,
}

/// Resolve every pending alert for a product
pub async fn resolve_alerts_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ResolveForProductResponse>> {
    let service = AlertService::new(state.db);
    let resolved = service.resolve_for_product(product_id).await?;
    Ok(Json(ResolveForProductResponse { resolved }))
}
