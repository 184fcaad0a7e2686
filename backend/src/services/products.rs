//! Product catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{AlertBanding, StockSeverity};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{MovementContext, StockChange, StockLedger};

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
    banding: AlertBanding,
}

/// Product row as exposed over the API
#[derive(Debug, Serialize, FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub category: Option<String>,
    pub price: Decimal,
    pub purchase_price: Option<Decimal>,
    pub stock: i32,
    pub min_stock: i32,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Decimal,
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    pub min_stock: i32,
    pub image_url: Option<String>,
}

/// Input for updating a product. Stock is deliberately absent: stock only
/// changes through the movement ledger.
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Decimal,
    pub purchase_price: Option<Decimal>,
    pub min_stock: i32,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

/// Input for a manual stock correction
#[derive(Debug, Deserialize)]
pub struct UpdateStockInput {
    pub stock: i32,
    pub note: Option<String>,
}

/// Filters for the product listing
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub stock_status: Option<String>,
}

/// Stock status detail row
#[derive(Debug, Serialize)]
pub struct StockDetail {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub stock: i32,
    pub min_stock: i32,
    pub severity: StockSeverity,
}

#[derive(Debug, FromRow)]
struct StockDetailRow {
    id: Uuid,
    sku: String,
    name: String,
    category: Option<String>,
    stock: i32,
    min_stock: i32,
}

impl ProductService {
    pub fn new(db: PgPool, banding: AlertBanding) -> Self {
        Self { db, banding }
    }

    /// List active products with optional search, category, and stock-status
    /// filters.
    pub async fn list(&self, filter: ProductFilter) -> AppResult<Vec<ProductRecord>> {
        let stock_status = match filter.stock_status.as_deref() {
            None => None,
            Some(s @ ("out_of_stock" | "low" | "ok")) => Some(s),
            Some(other) => {
                return Err(AppError::InvalidRequest(format!(
                    "Invalid stock status filter: {other}"
                )))
            }
        };
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        let products = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT p.id, p.sku, p.name, p.description, p.category_id,
                   c.name AS category, p.price, p.purchase_price, p.stock, p.min_stock,
                   p.image_url, p.active, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.active = TRUE
              AND ($1::text IS NULL OR p.name ILIKE $1 OR p.sku ILIKE $1 OR c.name ILIKE $1)
              AND ($2::uuid IS NULL OR p.category_id = $2)
              AND ($3::text IS NULL
                   OR ($3 = 'out_of_stock' AND p.stock <= 0)
                   OR ($3 = 'low' AND p.stock > 0 AND p.stock <= p.min_stock)
                   OR ($3 = 'ok' AND p.stock > p.min_stock))
            ORDER BY p.name
            "#,
        )
        .bind(&search)
        .bind(filter.category_id)
        .bind(stock_status)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    pub async fn get(&self, product_id: Uuid) -> AppResult<ProductRecord> {
        sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT p.id, p.sku, p.name, p.description, p.category_id,
                   c.name AS category, p.price, p.purchase_price, p.stock, p.min_stock,
                   p.image_url, p.active, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Create a product. Initial stock is recorded as an Entry movement so
    /// the ledger covers the product's entire history.
    pub async fn create(&self, actor: Uuid, input: CreateProductInput) -> AppResult<ProductRecord> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }
        if input.stock < 0 || input.min_stock < 0 {
            return Err(AppError::Validation {
                field: "stock".to_string(),
                message: "Stock levels cannot be negative".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products
                (sku, name, description, category_id, price, purchase_price,
                 stock, min_stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.purchase_price)
        .bind(input.min_stock)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await?;

        if input.stock > 0 {
            let product = StockLedger::lock_product(&mut tx, product_id).await?;
            StockLedger::apply_change(
                &mut tx,
                self.banding,
                &product,
                StockChange::Entry {
                    quantity: input.stock,
                },
                actor,
                MovementContext {
                    sale_id: None,
                    reference: None,
                    note: Some("Initial stock"),
                },
            )
            .await?;
        } else {
            // A product created empty still gets its alert derived.
            let product = StockLedger::lock_product(&mut tx, product_id).await?;
            StockLedger::refresh_alert(&mut tx, self.banding, &product, 0).await?;
        }

        tx.commit().await?;

        self.get(product_id).await
    }

    /// Update a product's catalog fields.
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<ProductRecord> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = $1, name = $2, description = $3, category_id = $4,
                price = $5, purchase_price = $6, min_stock = $7, image_url = $8,
                active = COALESCE($9, active), updated_at = CURRENT_TIMESTAMP
            WHERE id = $10
            "#,
        )
        .bind(&input.sku)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.purchase_price)
        .bind(input.min_stock)
        .bind(&input.image_url)
        .bind(input.active)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.get(product_id).await
    }

    /// Deactivate a product. Products are never physically deleted.
    pub async fn deactivate(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET active = FALSE, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Set a product's stock by registering the implied movement: an Entry
    /// when raising, an Exit when lowering. Keeps manual corrections on the
    /// ledger instead of writing the stock column directly.
    pub async fn update_stock(
        &self,
        actor: Uuid,
        product_id: Uuid,
        input: UpdateStockInput,
    ) -> AppResult<ProductRecord> {
        if input.stock < 0 {
            return Err(AppError::Validation {
                field: "stock".to_string(),
                message: "Stock cannot be negative".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let product = StockLedger::lock_product(&mut tx, product_id).await?;
        let change = if input.stock > product.stock {
            Some(StockChange::Entry {
                quantity: input.stock - product.stock,
            })
        } else if input.stock < product.stock {
            Some(StockChange::Exit {
                quantity: product.stock - input.stock,
            })
        } else {
            None
        };

        if let Some(change) = change {
            StockLedger::apply_change(
                &mut tx,
                self.banding,
                &product,
                change,
                actor,
                MovementContext {
                    sale_id: None,
                    reference: None,
                    note: Some(input.note.as_deref().unwrap_or("Manual stock update")),
                },
            )
            .await?;
        }

        tx.commit().await?;

        self.get(product_id).await
    }

    /// Stock status detail for every active product, most urgent first.
    pub async fn stock_details(&self) -> AppResult<Vec<StockDetail>> {
        let rows = sqlx::query_as::<_, StockDetailRow>(
            r#"
            SELECT p.id, p.sku, p.name, c.name AS category, p.stock, p.min_stock
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.active = TRUE
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut details: Vec<StockDetail> = rows
            .into_iter()
            .map(|r| StockDetail {
                severity: StockSeverity::classify(
                    r.stock,
                    r.min_stock,
                    self.banding.approaching_factor,
                ),
                id: r.id,
                sku: r.sku,
                name: r.name,
                category: r.category,
                stock: r.stock,
                min_stock: r.min_stock,
            })
            .collect();
        details.sort_by_key(|d| (d.severity.rank(), d.stock));

        Ok(details)
    }
}
