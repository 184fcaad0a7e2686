//! Inventory service: movement registration, movement history, and the
//! inventory summary

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{AlertBanding, MovementType};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{MovementContext, StockChange, StockLedger};

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    banding: AlertBanding,
}

/// Input for registering an inventory movement
#[derive(Debug, Deserialize)]
pub struct RegisterMovementInput {
    pub movement_type: String,
    pub product_id: Uuid,
    /// Units for entries and exits; the absolute target level for
    /// adjustments.
    pub quantity: i32,
    pub note: Option<String>,
    pub reference: Option<String>,
    pub sale_id: Option<Uuid>,
}

/// Response after registering a movement
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub movement_id: Uuid,
    pub movement_type: MovementType,
    pub previous_stock: i32,
    pub new_stock: i32,
}

/// Filters for the movement history
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub movement_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// Movement history row
#[derive(Debug, Serialize, FromRow)]
pub struct MovementRecord {
    pub id: Uuid,
    pub movement_type: String,
    pub quantity: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub username: String,
    pub sale_id: Option<Uuid>,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inventory summary for the dashboard
#[derive(Debug, Serialize)]
pub struct InventorySummary {
    pub total_products: i64,
    pub inventory_value: Decimal,
    pub low_stock_products: i64,
    pub movements_this_month: i64,
}

impl InventoryService {
    pub fn new(db: PgPool, banding: AlertBanding) -> Self {
        Self { db, banding }
    }

    /// Register a movement and apply it to the product's stock as one atomic
    /// unit. Entries add, exits subtract (failing if stock is insufficient),
    /// adjustments set the stock to the requested absolute level while the
    /// ledger records the signed delta.
    pub async fn register_movement(
        &self,
        actor: Uuid,
        input: RegisterMovementInput,
    ) -> AppResult<MovementResponse> {
        let movement_type = MovementType::parse(&input.movement_type).ok_or_else(|| {
            AppError::InvalidRequest(format!("Invalid movement type: {}", input.movement_type))
        })?;

        let change = match movement_type {
            MovementType::Entry => StockChange::Entry {
                quantity: input.quantity,
            },
            MovementType::Exit => StockChange::Exit {
                quantity: input.quantity,
            },
            MovementType::Adjustment => StockChange::SetTo {
                target: input.quantity,
            },
        };

        let adjustment_note;
        let note = match (movement_type, input.note.as_deref()) {
            // Preserve the requested absolute level alongside the delta the
            // ledger stores.
            (MovementType::Adjustment, Some(note)) => {
                adjustment_note = format!("{} (stock set to {})", note, input.quantity);
                Some(adjustment_note.as_str())
            }
            (MovementType::Adjustment, None) => {
                adjustment_note = format!("Stock set to {}", input.quantity);
                Some(adjustment_note.as_str())
            }
            (_, note) => note,
        };

        let mut tx = self.db.begin().await?;

        let product = StockLedger::lock_product(&mut tx, input.product_id).await?;
        let applied = StockLedger::apply_change(
            &mut tx,
            self.banding,
            &product,
            change,
            actor,
            MovementContext {
                sale_id: input.sale_id,
                reference: input.reference.as_deref(),
                note,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            movement_id = %applied.movement_id,
            movement_type = %applied.movement_type,
            product_id = %input.product_id,
            previous_stock = applied.previous_stock,
            new_stock = applied.new_stock,
            "Inventory movement registered"
        );

        Ok(MovementResponse {
            movement_id: applied.movement_id,
            movement_type: applied.movement_type,
            previous_stock: applied.previous_stock,
            new_stock: applied.new_stock,
        })
    }

    /// Movement history, newest first.
    pub async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<MovementRecord>> {
        let movement_type = match &filter.movement_type {
            Some(t) => Some(
                MovementType::parse(t)
                    .ok_or_else(|| {
                        AppError::InvalidRequest(format!("Invalid movement type: {t}"))
                    })?
                    .as_str(),
            ),
            None => None,
        };
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));
        let limit = filter.limit.unwrap_or(100).clamp(1, 500);

        let movements = sqlx::query_as::<_, MovementRecord>(
            r#"
            SELECT m.id, m.movement_type, m.quantity, m.product_id, p.name AS product_name,
                   u.username, m.sale_id, m.reference, m.note, m.created_at
            FROM inventory_movements m
            JOIN products p ON p.id = m.product_id
            JOIN users u ON u.id = m.user_id
            WHERE ($1::text IS NULL OR m.movement_type = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR u.username ILIKE $2 OR m.note ILIKE $2)
            ORDER BY m.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(movement_type)
        .bind(&search)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Inventory summary for the dashboard.
    pub async fn summary(&self) -> AppResult<InventorySummary> {
        let row = sqlx::query_as::<_, (i64, Option<Decimal>, i64)>(
            r#"
            SELECT COUNT(*),
                   SUM(stock * price),
                   COUNT(*) FILTER (WHERE stock <= min_stock)
            FROM products
            WHERE active = TRUE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let movements_this_month = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM inventory_movements
            WHERE DATE_TRUNC('month', created_at) = DATE_TRUNC('month', CURRENT_TIMESTAMP)
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(InventorySummary {
            total_products: row.0,
            inventory_value: row.1.unwrap_or(Decimal::ZERO),
            low_stock_products: row.2,
            movements_this_month,
        })
    }
}
