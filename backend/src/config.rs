//! Configuration management for the retail inventory backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RETAIL_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::AlertBanding;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// SMTP transport for the stock digest
    pub smtp: SmtpConfig,

    /// Digest scheduling configuration
    pub digest: DigestConfig,

    /// Stock alert banding
    pub alerts: AlertConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,

    /// SMTP port
    pub port: u16,

    /// SMTP username
    pub username: String,

    /// SMTP password (app password for Gmail-style relays)
    pub password: String,

    /// Sender address used on digest mail
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    /// Whether the scheduled digest is active
    pub enabled: bool,

    /// Recipient of the stock digest
    pub recipient: String,

    /// Local hours of day (0-23) at which the digest is sent
    pub send_hours: Vec<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertConfig {
    /// Fraction of the minimum stock at or below which alerts are High
    pub high_band: f64,

    /// Factor above the minimum that still produces a Low "approaching" alert
    pub approaching_factor: f64,
}

impl AlertConfig {
    pub fn banding(&self) -> AlertBanding {
        AlertBanding {
            high_band: self.high_band,
            approaching_factor: self.approaching_factor,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("RETAIL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3001)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("jwt.access_token_expiry", 86400)?
            .set_default("smtp.host", "smtp.gmail.com")?
            .set_default("smtp.port", 587)?
            .set_default("smtp.username", "")?
            .set_default("smtp.password", "")?
            .set_default("smtp.from", "Retail Inventory <noreply@localhost>")?
            .set_default("digest.enabled", true)?
            .set_default("digest.recipient", "")?
            .set_default("digest.send_hours", vec![8i64, 12i64])?
            .set_default("alerts.high_band", 1.0)?
            .set_default("alerts.approaching_factor", 1.2)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RETAIL_ prefix)
            .add_source(
                Environment::with_prefix("RETAIL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
