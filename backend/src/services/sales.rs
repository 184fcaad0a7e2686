//! Sale service: creation, status transitions, listing, and statistics
//!
//! Sale creation and cancellation are the transactional core of the system:
//! every stock check, stock write, and ledger row for a sale commits or rolls
//! back together.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{line_subtotal, AlertBanding, Pagination, PaginatedResponse, PaginationMeta, SaleStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{MovementContext, StockChange, StockLedger};

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
    banding: AlertBanding,
}

/// One requested sale line
#[derive(Debug, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<SaleItemInput>,
}

/// Response after a successful sale creation
#[derive(Debug, Serialize)]
pub struct CreateSaleResponse {
    pub sale_id: Uuid,
    pub total: Decimal,
}

/// Input for a sale status transition
#[derive(Debug, Deserialize)]
pub struct SetStatusInput {
    pub status: String,
}

/// Response after a status transition
#[derive(Debug, Serialize)]
pub struct SetStatusResponse {
    pub sale_id: Uuid,
    pub status: SaleStatus,
}

/// Filters for the sale listing
#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub customer: Option<String>,
}

/// Sale summary row for listings
#[derive(Debug, Serialize, FromRow)]
pub struct SaleSummary {
    pub id: Uuid,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub total: Decimal,
    pub status: String,
    pub payment_method: String,
    pub customer: String,
    pub item_count: i64,
}

/// Full sale detail
#[derive(Debug, Serialize)]
pub struct SaleDetail {
    pub id: Uuid,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub total: Decimal,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub customer: String,
    pub customer_email: String,
    pub items: Vec<SaleItemDetail>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct SaleItemDetail {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
    pub line_number: i32,
}

#[derive(Debug, FromRow)]
struct SaleHeaderRow {
    id: Uuid,
    sale_date: NaiveDate,
    created_at: DateTime<Utc>,
    total: Decimal,
    status: String,
    payment_method: String,
    notes: Option<String>,
    customer: String,
    customer_email: String,
}

/// Reporting period for sale statistics, replacing ad hoc interval strings
/// with named variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    Week,
    Month,
    Year,
}

impl SalesPeriod {
    pub fn days(&self) -> i32 {
        match self {
            SalesPeriod::Week => 7,
            SalesPeriod::Month => 30,
            SalesPeriod::Year => 365,
        }
    }
}

/// Sale statistics over a period
#[derive(Debug, Serialize)]
pub struct SaleStats {
    pub total_revenue: Decimal,
    pub transaction_count: i64,
    pub average_sale: Decimal,
    pub completed: i64,
    pub pending: i64,
    pub cancelled: i64,
}

/// Per-line input checks: positive quantity, and a discount that never
/// exceeds the line's gross amount (a negative subtotal would otherwise only
/// surface as a constraint violation at the store).
fn validate_item(item: &SaleItemInput) -> AppResult<()> {
    if item.quantity <= 0 {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "Item quantity must be positive".to_string(),
        });
    }
    if item.discount < Decimal::ZERO {
        return Err(AppError::Validation {
            field: "discount".to_string(),
            message: "Discount cannot be negative".to_string(),
        });
    }
    if item.discount > item.unit_price * Decimal::from(item.quantity) {
        return Err(AppError::Validation {
            field: "discount".to_string(),
            message: "Discount cannot exceed the line amount".to_string(),
        });
    }
    Ok(())
}

impl SaleService {
    pub fn new(db: PgPool, banding: AlertBanding) -> Self {
        Self { db, banding }
    }

    /// Create a sale atomically: insert the sale and its line items, decrement
    /// each product's stock, and append one Exit movement per line. A failure
    /// at any point (unknown product, insufficient stock) rolls the whole
    /// transaction back, leaving no partial record.
    pub async fn create_sale(
        &self,
        actor: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<CreateSaleResponse> {
        if input.items.is_empty() {
            return Err(AppError::InvalidRequest(
                "A sale must contain at least one item".to_string(),
            ));
        }
        for item in &input.items {
            validate_item(item)?;
        }

        let total: Decimal = input
            .items
            .iter()
            .map(|i| line_subtotal(i.unit_price, i.quantity, i.discount))
            .sum();
        let payment_method = input
            .payment_method
            .unwrap_or_else(|| "card".to_string());

        let mut tx = self.db.begin().await?;

        let sale_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales (sale_date, total, status, payment_method, notes, user_id)
            VALUES (CURRENT_DATE, $1, 'completed', $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(total)
        .bind(&payment_method)
        .bind(&input.notes)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;

        for (index, item) in input.items.iter().enumerate() {
            let product = StockLedger::lock_product(&mut tx, item.product_id).await?;
            let subtotal = line_subtotal(item.unit_price, item.quantity, item.discount);

            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (sale_id, product_id, quantity, unit_price, discount, subtotal, line_number)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(sale_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount)
            .bind(subtotal)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;

            StockLedger::apply_change(
                &mut tx,
                self.banding,
                &product,
                StockChange::Exit {
                    quantity: item.quantity,
                },
                actor,
                MovementContext {
                    sale_id: Some(sale_id),
                    reference: None,
                    note: Some("Sale"),
                },
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(%sale_id, %total, items = input.items.len(), "Sale created");

        Ok(CreateSaleResponse { sale_id, total })
    }

    /// Transition a sale's status. Moving into Cancelled restores the stock
    /// of every line item and records a compensating Entry movement per line,
    /// so the ledger still reconciles after a cancellation.
    pub async fn set_status(
        &self,
        actor: Uuid,
        sale_id: Uuid,
        input: SetStatusInput,
    ) -> AppResult<SetStatusResponse> {
        let target = SaleStatus::parse(&input.status).ok_or_else(|| {
            AppError::InvalidRequest(format!("Invalid sale status: {}", input.status))
        })?;

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let current = SaleStatus::parse(&current)
            .ok_or_else(|| AppError::InvalidRequest(format!("Corrupt sale status: {current}")))?;

        // Restore stock only on the transition into Cancelled; a sale that is
        // already cancelled must not be restored twice.
        if target == SaleStatus::Cancelled && current != SaleStatus::Cancelled {
            let items = sqlx::query_as::<_, (Uuid, i32)>(
                "SELECT product_id, quantity FROM sale_items WHERE sale_id = $1 ORDER BY line_number",
            )
            .bind(sale_id)
            .fetch_all(&mut *tx)
            .await?;

            for (product_id, quantity) in items {
                // Restoration is unconditional: a product deactivated since
                // the sale still gets its stock back.
                let product = StockLedger::lock_product_any(&mut tx, product_id).await?;
                StockLedger::apply_change(
                    &mut tx,
                    self.banding,
                    &product,
                    StockChange::Entry { quantity },
                    actor,
                    MovementContext {
                        sale_id: Some(sale_id),
                        reference: None,
                        note: Some("Sale cancellation"),
                    },
                )
                .await?;
            }
        }

        sqlx::query("UPDATE sales SET status = $1 WHERE id = $2")
            .bind(target.as_str())
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%sale_id, status = %target, "Sale status updated");

        Ok(SetStatusResponse {
            sale_id,
            status: target,
        })
    }

    /// List sales with optional filters and pagination.
    pub async fn list_sales(
        &self,
        filter: SaleFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<SaleSummary>> {
        let status = match &filter.status {
            Some(s) => Some(
                SaleStatus::parse(s)
                    .ok_or_else(|| AppError::InvalidRequest(format!("Invalid sale status: {s}")))?,
            ),
            None => None,
        };
        let status = status.map(|s| s.as_str());
        let customer = filter.customer.as_ref().map(|c| format!("%{c}%"));

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM sales s
            JOIN users u ON u.id = s.user_id
            WHERE ($1::text IS NULL OR s.status = $1)
              AND ($2::date IS NULL OR s.sale_date >= $2)
              AND ($3::date IS NULL OR s.sale_date <= $3)
              AND ($4::text IS NULL OR u.username ILIKE $4)
            "#,
        )
        .bind(status)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(&customer)
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.sale_date, s.created_at, s.total, s.status, s.payment_method,
                   u.username AS customer,
                   (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS item_count
            FROM sales s
            JOIN users u ON u.id = s.user_id
            WHERE ($1::text IS NULL OR s.status = $1)
              AND ($2::date IS NULL OR s.sale_date >= $2)
              AND ($3::date IS NULL OR s.sale_date <= $3)
              AND ($4::text IS NULL OR u.username ILIKE $4)
            ORDER BY s.sale_date DESC, s.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(status)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(&customer)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: sales,
            pagination: PaginationMeta::new(pagination, total_items as u64),
        })
    }

    /// Full detail for one sale, line items in order.
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleDetail> {
        let header = sqlx::query_as::<_, SaleHeaderRow>(
            r#"
            SELECT s.id, s.sale_date, s.created_at, s.total, s.status, s.payment_method,
                   s.notes, u.username AS customer, u.email AS customer_email
            FROM sales s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItemDetail>(
            r#"
            SELECT si.product_id, p.name AS product_name, si.quantity, si.unit_price,
                   si.discount, si.subtotal, si.line_number
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = $1
            ORDER BY si.line_number
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleDetail {
            id: header.id,
            sale_date: header.sale_date,
            created_at: header.created_at,
            total: header.total,
            status: header.status,
            payment_method: header.payment_method,
            notes: header.notes,
            customer: header.customer,
            customer_email: header.customer_email,
            items,
        })
    }

    /// Sale statistics over a trailing period. Cancelled sales count toward
    /// the transaction totals but not toward revenue or the average.
    pub async fn stats(&self, period: SalesPeriod) -> AppResult<SaleStats> {
        let row = sqlx::query_as::<_, (Option<Decimal>, i64, Option<Decimal>)>(
            r#"
            SELECT SUM(total) FILTER (WHERE status != 'cancelled'),
                   COUNT(*),
                   AVG(total) FILTER (WHERE status != 'cancelled')
            FROM sales
            WHERE sale_date >= CURRENT_DATE - $1
            "#,
        )
        .bind(period.days())
        .fetch_one(&self.db)
        .await?;

        let by_status = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM sales
            WHERE sale_date >= CURRENT_DATE - $1
            GROUP BY status
            "#,
        )
        .bind(period.days())
        .fetch_all(&self.db)
        .await?;

        let mut stats = SaleStats {
            total_revenue: row.0.unwrap_or(Decimal::ZERO),
            transaction_count: row.1,
            average_sale: row.2.unwrap_or(Decimal::ZERO),
            completed: 0,
            pending: 0,
            cancelled: 0,
        };
        for (status, count) in by_status {
            match status.as_str() {
                "completed" => stats.completed = count,
                "pending" => stats.pending = count,
                "cancelled" => stats.cancelled = count,
                _ => {}
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(quantity: i32, unit_price: &str, discount: &str) -> SaleItemInput {
        SaleItemInput {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: Decimal::from_str(unit_price).unwrap(),
            discount: Decimal::from_str(discount).unwrap(),
        }
    }

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(validate_item(&item(0, "5.00", "0.00")).is_err());
        assert!(validate_item(&item(-2, "5.00", "0.00")).is_err());
    }

    #[test]
    fn rejects_negative_discount() {
        assert!(validate_item(&item(1, "5.00", "-1.00")).is_err());
    }

    #[test]
    fn rejects_discount_exceeding_line_amount() {
        // 2 x 5.00 = 10.00 gross; 10.01 off would go negative
        let err = validate_item(&item(2, "5.00", "10.01")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "discount"));
    }

    #[test]
    fn accepts_discount_up_to_line_amount() {
        assert!(validate_item(&item(2, "5.00", "10.00")).is_ok());
        assert!(validate_item(&item(2, "5.00", "0.00")).is_ok());
    }
}
