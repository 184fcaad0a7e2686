//! HTTP handlers for category endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::categories::{CategoryInput, CategoryRecord, CategoryService};
use crate::services::products::{ProductFilter, ProductRecord, ProductService};
use crate::AppState;

/// List active categories with product counts
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryRecord>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list().await?;
    Ok(Json(categories))
}

/// Get one category
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<CategoryRecord>> {
    let service = CategoryService::new(state.db);
    let category = service.get(category_id).await?;
    Ok(Json(category))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<CategoryRecord>> {
    let service = CategoryService::new(state.db);
    let category = service.create(input).await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<CategoryRecord>> {
    let service = CategoryService::new(state.db);
    let category = service.update(category_id, input).await?;
    Ok(Json(category))
}

/// List the active products in a category
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductRecord>>> {
    // 404 for unknown categories rather than an empty list
    CategoryService::new(state.db.clone()).get(category_id).await?;

    let service = ProductService::new(state.db, state.config.alerts.banding());
    let products = service
        .list(ProductFilter {
            category_id: Some(category_id),
            ..Default::default()
        })
        .await?;
    Ok(Json(products))
}

/// Deactivate a category
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CategoryService::new(state.db);
    service.deactivate(category_id).await?;
    Ok(Json(()))
}
