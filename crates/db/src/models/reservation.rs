//! Reservation entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use curio_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `reservations` table.
///
/// `expires_at` is fixed at creation; a renewed claim is a new row.
/// `order_id` is set if and only if the lease completed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: DbId,
    pub product_id: DbId,
    pub actor_id: DbId,
    pub session_id: Option<Uuid>,
    pub quantity: i32,
    pub status_id: StatusId,
    pub reserved_at: Timestamp,
    pub expires_at: Timestamp,
    pub order_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/reservations`.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub product_id: DbId,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Lease length in minutes, bounded by policy. Defaults to 15.
    pub lease_duration_mins: Option<i64>,
}

/// DTO for `POST /api/v1/reservations/{id}/complete`, called by the order
/// pipeline once payment has settled.
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub order_id: DbId,
}

/// Public availability snapshot for one product, served to status pollers.
///
/// Field names follow the wire contract of the storefront clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatus {
    /// Live claims currently block every remaining unit.
    pub is_reserved: bool,
    /// Every unit has been sold.
    pub is_sold: bool,
    /// When the earliest live claim lapses, if any block the product.
    pub expires_at: Option<Timestamp>,
}
