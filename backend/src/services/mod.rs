//! Business logic services for the retail inventory backend

pub mod alerts;
pub mod analytics;
pub mod auth;
pub mod categories;
pub mod digest;
pub mod inventory;
pub mod products;
pub mod sales;
pub mod stock;

pub use alerts::AlertService;
pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use categories::CategoryService;
pub use digest::DigestService;
pub use inventory::InventoryService;
pub use products::ProductService;
pub use sales::SaleService;
