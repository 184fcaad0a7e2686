//! Route definitions for the retail inventory backend

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/sales", sale_routes())
        .nest("/inventory", inventory_routes())
        .nest("/alerts", alert_routes())
        .nest("/analytics", analytics_routes())
        .nest("/notifications", notification_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::login))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/stock/details", get(handlers::get_stock_details))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/stock", put(handlers::update_product_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/:category_id/products", get(handlers::list_category_products))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/stats", get(handlers::get_sale_stats))
        .route("/:sale_id", get(handlers::get_sale))
        .route("/:sale_id/status", patch(handlers::update_sale_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory movement routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::register_movement),
        )
        .route("/summary", get(handlers::get_inventory_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock alert routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/pending", get(handlers::list_pending_alerts))
        .route("/latest", get(handlers::latest_alerts))
        .route("/summary", get(handlers::get_alert_summary))
        .route("/:alert_id/resolve", put(handlers::resolve_alert))
        .route("/:alert_id/ignore", put(handlers::ignore_alert))
        .route(
            "/product/:product_id/resolve",
            put(handlers::resolve_alerts_for_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Analytics routes (protected)
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(handlers::get_sale_stats))
        .route("/history", get(handlers::get_sales_history))
        .route("/top-products", get(handlers::get_top_products))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/export/sales", get(handlers::export_sales))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/send-digest", post(handlers::send_stock_digest))
        .route("/stock-summary", get(handlers::get_stock_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}
