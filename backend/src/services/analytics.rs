//! Sales analytics: history series, top products, dashboard summary, and
//! the CSV export

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::sales::SalesPeriod;

#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// One day of the sales history series
#[derive(Debug, Serialize, FromRow)]
pub struct SalesHistoryPoint {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub transactions: i64,
}

/// A product ranked by units sold over the period
#[derive(Debug, Serialize, FromRow)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

/// Dashboard summary figures
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub revenue_today: Decimal,
    pub transactions_today: i64,
    pub revenue_this_month: Decimal,
    pub transactions_this_month: i64,
    pub active_products: i64,
    pub pending_alerts: i64,
}

/// Sale row for the CSV export
#[derive(Debug, FromRow)]
struct ExportRow {
    id: Uuid,
    sale_date: NaiveDate,
    status: String,
    payment_method: String,
    total: Decimal,
    item_count: i64,
    username: String,
}

impl AnalyticsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Daily revenue and transaction counts over the period. Cancelled sales
    /// are excluded. Days without sales are absent from the series.
    pub async fn sales_history(&self, period: SalesPeriod) -> AppResult<Vec<SalesHistoryPoint>> {
        let points = sqlx::query_as::<_, SalesHistoryPoint>(
            r#"
            SELECT sale_date AS date,
                   COALESCE(SUM(total), 0) AS revenue,
                   COUNT(*) AS transactions
            FROM sales
            WHERE status != 'cancelled'
              AND sale_date >= CURRENT_DATE - $1::int
            GROUP BY sale_date
            ORDER BY sale_date
            "#,
        )
        .bind(period.days())
        .fetch_all(&self.db)
        .await?;

        Ok(points)
    }

    /// Best-selling products by units over the period.
    pub async fn top_products(
        &self,
        period: SalesPeriod,
        limit: Option<i64>,
    ) -> AppResult<Vec<TopProduct>> {
        let limit = limit.unwrap_or(10).clamp(1, 100);

        let products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.id AS product_id, p.name, p.sku,
                   SUM(i.quantity)::bigint AS units_sold,
                   SUM(i.subtotal) AS revenue
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            JOIN products p ON p.id = i.product_id
            WHERE s.status != 'cancelled'
              AND s.sale_date >= CURRENT_DATE - $1::int
            GROUP BY p.id
            ORDER BY units_sold DESC, revenue DESC
            LIMIT $2
            "#,
        )
        .bind(period.days())
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Headline figures for the dashboard.
    pub async fn dashboard(&self) -> AppResult<DashboardSummary> {
        let sales = sqlx::query_as::<_, (Option<Decimal>, i64, Option<Decimal>, i64)>(
            r#"
            SELECT SUM(total) FILTER (WHERE sale_date = CURRENT_DATE),
                   COUNT(*) FILTER (WHERE sale_date = CURRENT_DATE),
                   SUM(total) FILTER (WHERE DATE_TRUNC('month', sale_date) = DATE_TRUNC('month', CURRENT_DATE)),
                   COUNT(*) FILTER (WHERE DATE_TRUNC('month', sale_date) = DATE_TRUNC('month', CURRENT_DATE))
            FROM sales
            WHERE status != 'cancelled'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let active_products = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE active = TRUE",
        )
        .fetch_one(&self.db)
        .await?;

        let pending_alerts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_alerts WHERE status = 'pending'",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardSummary {
            revenue_today: sales.0.unwrap_or(Decimal::ZERO),
            transactions_today: sales.1,
            revenue_this_month: sales.2.unwrap_or(Decimal::ZERO),
            transactions_this_month: sales.3,
            active_products,
            pending_alerts,
        })
    }

    /// Export sales in a date range as CSV, newest first.
    pub async fn export_sales_csv(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<String> {
        let rows = sqlx::query_as::<_, ExportRow>(
            r#"
            SELECT s.id, s.sale_date, s.status, s.payment_method, s.total,
                   COUNT(i.id) AS item_count, u.username
            FROM sales s
            JOIN users u ON u.id = s.user_id
            LEFT JOIN sale_items i ON i.sale_id = s.id
            WHERE ($1::date IS NULL OR s.sale_date >= $1)
              AND ($2::date IS NULL OR s.sale_date <= $2)
            GROUP BY s.id, u.username
            ORDER BY s.sale_date DESC, s.created_at DESC
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.db)
        .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "id",
                "date",
                "status",
                "payment_method",
                "total",
                "items",
                "sold_by",
            ])
            .map_err(anyhow::Error::new)?;
        for row in rows {
            writer
                .write_record([
                    row.id.to_string(),
                    row.sale_date.to_string(),
                    row.status,
                    row.payment_method,
                    row.total.to_string(),
                    row.item_count.to_string(),
                    row.username,
                ])
                .map_err(anyhow::Error::new)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(anyhow::Error::new(e)))
    }
}
