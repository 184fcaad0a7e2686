//! Shared types and models for the retail inventory backend
//!
//! This crate contains the domain types and the pure stock/sale arithmetic
//! shared between the backend services and their tests.

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
