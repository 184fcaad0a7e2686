//! HTTP handlers for notification endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::digest::{DigestReport, DigestService, StockSummary};
use crate::AppState;

/// Trigger a stock digest send immediately
pub async fn send_stock_digest(State(state): State<AppState>) -> AppResult<Json<DigestReport>> {
    let service = DigestService::new(
        state.db,
        state.config.smtp.clone(),
        state.config.digest.clone(),
        state.config.alerts.banding(),
    );
    let report = service.send_digest().await?;
    Ok(Json(report))
}

/// Stock band counts, as included in the digest
pub async fn get_stock_summary(State(state): State<AppState>) -> AppResult<Json<StockSummary>> {
    let service = DigestService::new(
        state.db,
        state.config.smtp.clone(),
        state.config.digest.clone(),
        state.config.alerts.banding(),
    );
    let summary = service.stock_summary().await?;
    Ok(Json(summary))
}
