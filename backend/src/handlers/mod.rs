//! HTTP request handlers

mod alerts;
mod analytics;
mod auth;
mod categories;
mod health;
mod inventory;
mod notifications;
mod products;
mod sales;

pub use alerts::*;
pub use analytics::*;
pub use auth::*;
pub use categories::*;
pub use health::*;
pub use inventory::*;
pub use notifications::*;
pub use products::*;
pub use sales::*;
