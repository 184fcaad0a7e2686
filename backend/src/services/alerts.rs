//! Stock alert service
//!
//! Alerts are derived by the stock ledger when a movement lands a product in
//! an at-risk band; this service only reads and transitions them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::AlertStatus;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// Alert row with its product context
#[derive(Debug, Serialize, FromRow)]
pub struct AlertRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub stock: i32,
    pub min_stock: i32,
    pub priority: String,
    pub status: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Pending alert counts by priority
#[derive(Debug, Serialize)]
pub struct AlertSummary {
    pub total_pending: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl AlertService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Pending alerts, highest priority first, then oldest first.
    pub async fn list_pending(&self) -> AppResult<Vec<AlertRecord>> {
        let alerts = sqlx::query_as::<_, AlertRecord>(
            r#"
            SELECT a.id, a.product_id, p.name AS product_name, p.sku,
                   p.stock, p.min_stock, a.priority, a.status, a.message,
                   a.created_at, a.resolved_at
            FROM stock_alerts a
            JOIN products p ON p.id = a.product_id
            WHERE a.status = 'pending'
            ORDER BY CASE a.priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                     a.created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Full alert history, newest first.
    pub async fn list_all(&self, limit: Option<i64>) -> AppResult<Vec<AlertRecord>> {
        let limit = limit.unwrap_or(100).clamp(1, 500);

        let alerts = sqlx::query_as::<_, AlertRecord>(
            r#"
            SELECT a.id, a.product_id, p.name AS product_name, p.sku,
                   p.stock, p.min_stock, a.priority, a.status, a.message,
                   a.created_at, a.resolved_at
            FROM stock_alerts a
            JOIN products p ON p.id = a.product_id
            ORDER BY a.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Most recent pending alerts, for the notification bell.
    pub async fn latest(&self, limit: Option<i64>) -> AppResult<Vec<AlertRecord>> {
        let limit = limit.unwrap_or(5).clamp(1, 50);

        let alerts = sqlx::query_as::<_, AlertRecord>(
            r#"
            SELECT a.id, a.product_id, p.name AS product_name, p.sku,
                   p.stock, p.min_stock, a.priority, a.status, a.message,
                   a.created_at, a.resolved_at
            FROM stock_alerts a
            JOIN products p ON p.id = a.product_id
            WHERE a.status = 'pending'
            ORDER BY a.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Pending alert counts by priority.
    pub async fn summary(&self) -> AppResult<AlertSummary> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE priority = 'high'),
                   COUNT(*) FILTER (WHERE priority = 'medium'),
                   COUNT(*) FILTER (WHERE priority = 'low')
            FROM stock_alerts
            WHERE status = 'pending'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(AlertSummary {
            total_pending: row.0,
            high: row.1,
            medium: row.2,
            low: row.3,
        })
    }

    /// Mark a pending alert resolved.
    pub async fn resolve(&self, alert_id: Uuid) -> AppResult<()> {
        self.transition(alert_id, AlertStatus::Resolved).await
    }

    /// Dismiss a pending alert without acting on it.
    pub async fn ignore(&self, alert_id: Uuid) -> AppResult<()> {
        self.transition(alert_id, AlertStatus::Ignored).await
    }

    async fn transition(&self, alert_id: Uuid, status: AlertStatus) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_alerts
            SET status = $1, resolved_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(alert_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pending alert".to_string()));
        }

        Ok(())
    }

    /// Resolve every pending alert for a product. Returns how many were
    /// closed; zero is not an error.
    pub async fn resolve_for_product(&self, product_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE stock_alerts
            SET status = 'resolved', resolved_at = CURRENT_TIMESTAMP
            WHERE product_id = $1 AND status = 'pending'
            "#,
        )
        .bind(product_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
