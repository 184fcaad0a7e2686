//! HTTP handlers for inventory movement endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    InventoryService, InventorySummary, MovementFilter, MovementRecord, MovementResponse,
    RegisterMovementInput,
};
use crate::AppState;

/// Register an inventory movement
pub async fn register_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterMovementInput>,
) -> AppResult<Json<MovementResponse>> {
    let service = InventoryService::new(state.db, state.config.alerts.banding());
    let response = service
        .register_movement(current_user.0.user_id, input)
        .await?;
    Ok(Json(response))
}

/// Movement history, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<MovementRecord>>> {
    let service = InventoryService::new(state.db, state.config.alerts.banding());
    let movements = service.list_movements(filter).await?;
    Ok(Json(movements))
}

/// Inventory summary for the dashboard
pub async fn get_inventory_summary(
    State(state): State<AppState>,
) -> AppResult<Json<InventorySummary>> {
    let service = InventoryService::new(state.db, state.config.alerts.banding());
    let summary = service.summary().await?;
    Ok(Json(summary))
}
