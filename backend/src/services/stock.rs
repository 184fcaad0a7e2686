//! Stock ledger engine
//!
//! Owns the invariant that a product's recorded stock always equals the net
//! sum of its inventory movements, and that no exit can drive stock negative.
//! Every mutation here runs against a caller-supplied transaction so a sale,
//! a cancellation, or a movement registration commits or rolls back as one
//! unit. The product row is locked (`FOR UPDATE`) before the check-and-write,
//! which serializes concurrent mutations of the same product at the store.

use chrono::Utc;
use shared::{AlertBanding, MovementType};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Requested change to a product's stock level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    /// Add units (entry movement)
    Entry { quantity: i32 },
    /// Remove units; fails with `InsufficientStock` if not enough are
    /// available (exit movement)
    Exit { quantity: i32 },
    /// Set stock to an absolute level; the ledger records the signed delta
    /// (adjustment movement)
    SetTo { target: i32 },
}

/// Product fields the engine needs while holding the row lock
#[derive(Debug, sqlx::FromRow)]
pub struct LockedProduct {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    pub min_stock: i32,
}

/// Context recorded on the movement row
#[derive(Debug, Default)]
pub struct MovementContext<'a> {
    pub sale_id: Option<Uuid>,
    pub reference: Option<&'a str>,
    pub note: Option<&'a str>,
}

/// Outcome of an applied stock change
#[derive(Debug)]
pub struct AppliedChange {
    pub movement_id: Uuid,
    pub movement_type: MovementType,
    pub previous_stock: i32,
    pub new_stock: i32,
}

/// Transaction-scoped stock reconciliation primitives. The sale and
/// inventory services compose these; nothing else writes to `products.stock`
/// or `inventory_movements`.
pub struct StockLedger;

impl StockLedger {
    /// Fetch an active product's stock row and lock it for the rest of the
    /// transaction.
    pub async fn lock_product(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> AppResult<LockedProduct> {
        sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, stock, min_stock FROM products WHERE id = $1 AND active = TRUE FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Fetch a product's stock row regardless of its active flag and lock it.
    /// The cancellation reversal uses this: restoring a sale's stock is
    /// unconditional, and a product deactivated after the sale must not block
    /// it.
    pub async fn lock_product_any(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> AppResult<LockedProduct> {
        sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, stock, min_stock FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Apply a stock change to an already-locked product: write the new
    /// stock level, append the ledger row, and re-derive the stock alert.
    pub async fn apply_change(
        tx: &mut Transaction<'_, Postgres>,
        banding: AlertBanding,
        product: &LockedProduct,
        change: StockChange,
        actor: Uuid,
        context: MovementContext<'_>,
    ) -> AppResult<AppliedChange> {
        let (movement_type, ledger_quantity, new_stock) = match change {
            StockChange::Entry { quantity } => {
                validate_quantity(quantity)?;
                (MovementType::Entry, quantity, product.stock + quantity)
            }
            StockChange::Exit { quantity } => {
                validate_quantity(quantity)?;
                if product.stock < quantity {
                    return Err(AppError::InsufficientStock {
                        available: product.stock,
                        requested: quantity,
                    });
                }
                (MovementType::Exit, quantity, product.stock - quantity)
            }
            StockChange::SetTo { target } => {
                if target < 0 {
                    return Err(AppError::Validation {
                        field: "quantity".to_string(),
                        message: "Adjusted stock cannot be negative".to_string(),
                    });
                }
                // Ledger keeps the signed delta so net-sum reconciliation
                // still holds; the absolute target lands in the note.
                let delta = shared::adjustment_delta(product.stock, target);
                (MovementType::Adjustment, delta, target)
            }
        };

        sqlx::query("UPDATE products SET stock = $1, updated_at = $2 WHERE id = $3")
            .bind(new_stock)
            .bind(Utc::now())
            .bind(product.id)
            .execute(&mut **tx)
            .await?;

        let movement_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory_movements
                (movement_type, quantity, product_id, user_id, sale_id, reference, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(movement_type.as_str())
        .bind(ledger_quantity)
        .bind(product.id)
        .bind(actor)
        .bind(context.sale_id)
        .bind(context.reference)
        .bind(context.note)
        .fetch_one(&mut **tx)
        .await?;

        Self::refresh_alert(tx, banding, product, new_stock).await?;

        Ok(AppliedChange {
            movement_id,
            movement_type,
            previous_stock: product.stock,
            new_stock,
        })
    }

    /// Derive the stock alert for the product's new level. Idempotent: the
    /// partial unique index on pending alerts guarantees at most one Pending
    /// alert per product, so re-evaluating an unchanged level is a no-op.
    pub async fn refresh_alert(
        tx: &mut Transaction<'_, Postgres>,
        banding: AlertBanding,
        product: &LockedProduct,
        new_stock: i32,
    ) -> AppResult<()> {
        let Some(priority) = banding.priority_for(new_stock, product.min_stock) else {
            return Ok(());
        };

        let message = alert_message(&product.name, new_stock, product.min_stock);

        sqlx::query(
            r#"
            INSERT INTO stock_alerts (product_id, priority, status, message)
            VALUES ($1, $2, 'pending', $3)
            ON CONFLICT (product_id) WHERE status = 'pending' DO NOTHING
            "#,
        )
        .bind(product.id)
        .bind(priority.as_str())
        .bind(message)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "Quantity must be positive".to_string(),
        });
    }
    Ok(())
}

/// Message recorded on a derived stock alert
pub fn alert_message(product_name: &str, stock: i32, min_stock: i32) -> String {
    if stock == 0 {
        format!("{} is out of stock", product_name)
    } else if stock <= min_stock {
        format!(
            "{} is at critical stock: {} left (minimum {})",
            product_name, stock, min_stock
        )
    } else {
        format!(
            "{} is approaching its minimum stock: {} left (minimum {})",
            product_name, stock, min_stock
        )
    }
}
