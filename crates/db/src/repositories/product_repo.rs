//! Repository for the `products` table (catalog stock projection).

use sqlx::PgPool;

use curio_core::types::DbId;

use crate::models::product::{CreateProduct, Product};

/// Column list for `products` queries.
const COLUMNS: &str = "id, title, total_stock, sold_quantity, created_at, updated_at";

/// Provides access to the catalog stock projection.
pub struct ProductRepo;

impl ProductRepo {
    /// Register a product. `total_stock` defaults to 1 (one-of-a-kind items).
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (title, total_stock) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.title)
            .bind(input.total_stock.unwrap_or(1))
            .fetch_one(pool)
            .await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
