//! Category service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Category row with its active product count
#[derive(Debug, Serialize, FromRow)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryRecord>> {
        let categories = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT c.id, c.name, c.description, c.active,
                   COUNT(p.id) FILTER (WHERE p.active = TRUE) AS product_count,
                   c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.active = TRUE
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn get(&self, category_id: Uuid) -> AppResult<CategoryRecord> {
        sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT c.id, c.name, c.description, c.active,
                   COUNT(p.id) FILTER (WHERE p.active = TRUE) AS product_count,
                   c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<CategoryRecord> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
            });
        }

        let category_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        self.get(category_id).await
    }

    pub async fn update(&self, category_id: Uuid, input: CategoryInput) -> AppResult<CategoryRecord> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, description = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(category_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        self.get(category_id).await
    }

    /// Deactivate a category. Its products keep their category_id; listings
    /// filter on the category's active flag instead.
    pub async fn deactivate(&self, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE categories SET active = FALSE, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(category_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }
}
