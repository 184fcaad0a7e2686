//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::products::{
    CreateProductInput, ProductFilter, ProductRecord, ProductService, StockDetail,
    UpdateProductInput, UpdateStockInput,
};
use crate::AppState;

/// List active products with optional filters
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<ProductRecord>>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    let products = service.list(filter).await?;
    Ok(Json(products))
}

/// Get one product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    let product = service.get(product_id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    let product = service.create(current_user.0.user_id, input).await?;
    Ok(Json(product))
}

/// Update a product's catalog fields
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    let product = service.update(product_id, input).await?;
    Ok(Json(product))
}

/// Deactivate a product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    service.deactivate(product_id).await?;
    Ok(Json(()))
}

/// Set a product's stock, recording the implied movement
pub async fn update_product_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    let product = service
        .update_stock(current_user.0.user_id, product_id, input)
        .await?;
    Ok(Json(product))
}

/// Stock status detail for every active product
pub async fn get_stock_details(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StockDetail>>> {
    let service = ProductService::new(state.db, state.config.alerts.banding());
    let details = service.stock_details().await?;
    Ok(Json(details))
}
