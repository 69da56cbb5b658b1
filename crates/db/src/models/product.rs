//! Product stock projection models.
//!
//! The external catalog owns everything a shopper sees (price, title,
//! images); this service carries only the counters availability depends on.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use curio_core::types::{DbId, Timestamp};

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub title: String,
    pub total_stock: i32,
    pub sold_quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a product via `POST /api/v1/products`.
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub title: String,
    /// Defaults to 1: the catalog sells one-of-a-kind items.
    pub total_stock: Option<i32>,
}
