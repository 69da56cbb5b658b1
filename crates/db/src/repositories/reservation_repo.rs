//! Repository for the `reservations` table: the lease manager's
//! transactional core.
//!
//! Every read applies the lazy-expiry predicate in SQL
//! (`status_id = active AND expires_at > NOW()`), so a lease past its
//! deadline stops counting the moment it lapses regardless of whether the
//! sweeper has flipped its stored status yet.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use curio_core::availability::{self, Availability, StockSnapshot};
use curio_core::types::DbId;

use crate::models::reservation::{ProductStatus, Reservation};
use crate::models::status::ReservationStatus;

/// Column list for `reservations` queries.
const COLUMNS: &str = "\
    id, product_id, actor_id, session_id, quantity, status_id, \
    reserved_at, expires_at, order_id, created_at, updated_at";

/// Outcome of a reserve attempt. Unavailability is a normal result here,
/// not an error; only infrastructure faults surface as `sqlx::Error`.
#[derive(Debug)]
pub enum ReserveOutcome {
    /// A new lease was granted.
    Granted(Reservation),
    /// The actor already holds a live lease on this product; the existing
    /// record is returned idempotently.
    AlreadyHeld(Reservation),
    /// Not enough free units.
    Insufficient { remaining: i32 },
    /// No such product.
    UnknownProduct,
}

/// Stock counters row used inside the reserve transaction.
#[derive(sqlx::FromRow)]
struct StockRow {
    total_stock: i32,
    sold_quantity: i32,
}

/// Aggregated status row for one product.
#[derive(sqlx::FromRow)]
struct StatusRow {
    total_stock: i32,
    sold_quantity: i32,
    live_quantity: i64,
    next_release: Option<curio_core::types::Timestamp>,
}

/// Provides lease lifecycle operations for reservations.
pub struct ReservationRepo;

impl ReservationRepo {
    /// Atomically grant a lease on `product_id` if free units remain.
    ///
    /// The transaction takes `FOR UPDATE` on the product row first, which
    /// serializes concurrent reserve attempts on the same product across
    /// all server instances: among racing callers exactly one evaluates
    /// availability against a state that still shows a free unit. The
    /// check-then-insert is therefore atomic, not merely sequenced in the
    /// application.
    ///
    /// Quantity and lease bounds are validated by the caller against
    /// `curio_core::lease` policy before this is invoked.
    pub async fn reserve(
        pool: &PgPool,
        product_id: DbId,
        actor_id: DbId,
        session_id: Option<Uuid>,
        quantity: i32,
        lease_mins: i64,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stock = sqlx::query_as::<_, StockRow>(
            "SELECT total_stock, sold_quantity FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stock) = stock else {
            return Ok(ReserveOutcome::UnknownProduct);
        };

        // Idempotent re-reserve: a double-click returns the held lease
        // instead of creating a second record.
        if let Some(existing) = Self::find_live_for_actor(&mut tx, product_id, actor_id).await? {
            tx.commit().await?;
            return Ok(ReserveOutcome::AlreadyHeld(existing));
        }

        let live_reserved: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM reservations \
             WHERE product_id = $1 AND status_id = $2 AND expires_at > NOW()",
        )
        .bind(product_id)
        .bind(ReservationStatus::Active.id())
        .fetch_one(&mut *tx)
        .await?;

        let snapshot = StockSnapshot {
            total_stock: stock.total_stock,
            sold_quantity: stock.sold_quantity,
        };

        match availability::evaluate(snapshot, live_reserved, quantity) {
            Availability::Insufficient { remaining } => {
                Ok(ReserveOutcome::Insufficient { remaining })
            }
            Availability::Available => {
                let query = format!(
                    "INSERT INTO reservations \
                         (product_id, actor_id, session_id, quantity, status_id, expires_at) \
                     VALUES ($1, $2, $3, $4, $5, NOW() + make_interval(mins => $6)) \
                     RETURNING {COLUMNS}"
                );
                let reservation = sqlx::query_as::<_, Reservation>(&query)
                    .bind(product_id)
                    .bind(actor_id)
                    .bind(session_id)
                    .bind(quantity)
                    .bind(ReservationStatus::Active.id())
                    .bind(lease_mins as i32)
                    .fetch_one(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(ReserveOutcome::Granted(reservation))
            }
        }
    }

    /// Transition a live lease to `cancelled`.
    ///
    /// Returns the updated row, or `None` when the lease is missing, already
    /// terminal, or logically expired. The deadline guard means a cancel
    /// racing natural expiry fails instead of acting on a stale lease.
    /// Ownership is checked by the caller.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "UPDATE reservations SET status_id = $2 \
             WHERE id = $1 AND status_id = $3 AND expires_at > NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(ReservationStatus::Cancelled.id())
            .bind(ReservationStatus::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Transition a live lease to `completed`, stamping `order_id` and
    /// folding the sold units into the product's counters in the same
    /// transaction so the unit never reads as available again.
    ///
    /// Returns `None` when the lease is not live (the order pipeline must
    /// treat that as "reservation lost" and never charge).
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        order_id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE reservations SET status_id = $2, order_id = $3 \
             WHERE id = $1 AND status_id = $4 AND expires_at > NOW() \
             RETURNING {COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(ReservationStatus::Completed.id())
            .bind(order_id)
            .bind(ReservationStatus::Active.id())
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(reservation) = &reservation {
            sqlx::query("UPDATE products SET sold_quantity = sold_quantity + $2 WHERE id = $1")
                .bind(reservation.product_id)
                .bind(reservation.quantity)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(reservation)
    }

    /// Flip every logically expired lease to `expired`, returning the swept
    /// rows so callers can emit release events.
    ///
    /// Housekeeping only: reads already ignore lapsed leases, this keeps the
    /// active set small and tells waiting viewers a unit freed up.
    pub async fn sweep_expired(pool: &PgPool) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "UPDATE reservations SET status_id = $1 \
             WHERE status_id = $2 AND expires_at <= NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(ReservationStatus::Expired.id())
            .bind(ReservationStatus::Active.id())
            .fetch_all(pool)
            .await
    }

    /// Find a reservation by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The actor's live reservations, soonest deadline first (the
    /// "my reservations" view with countdowns).
    pub async fn list_live_by_actor(
        pool: &PgPool,
        actor_id: DbId,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations \
             WHERE actor_id = $1 AND status_id = $2 AND expires_at > NOW() \
             ORDER BY expires_at ASC"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(actor_id)
            .bind(ReservationStatus::Active.id())
            .fetch_all(pool)
            .await
    }

    /// Compute the public availability snapshot for one product.
    ///
    /// `expires_at` is the earliest live deadline: the moment a unit can
    /// next free up (for stock-1 items, simply the claim's deadline).
    pub async fn product_status(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Option<ProductStatus>, sqlx::Error> {
        let row = sqlx::query_as::<_, StatusRow>(
            "SELECT p.total_stock, p.sold_quantity, \
                    COALESCE(SUM(r.quantity) FILTER \
                        (WHERE r.status_id = $2 AND r.expires_at > NOW()), 0) AS live_quantity, \
                    MIN(r.expires_at) FILTER \
                        (WHERE r.status_id = $2 AND r.expires_at > NOW()) AS next_release \
             FROM products p \
             LEFT JOIN reservations r ON r.product_id = p.id \
             WHERE p.id = $1 \
             GROUP BY p.id",
        )
        .bind(product_id)
        .bind(ReservationStatus::Active.id())
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let is_sold = row.sold_quantity >= row.total_stock;
        let snapshot = StockSnapshot {
            total_stock: row.total_stock,
            sold_quantity: row.sold_quantity,
        };
        let is_reserved = !is_sold
            && matches!(
                availability::evaluate(snapshot, row.live_quantity, 1),
                Availability::Insufficient { .. }
            );

        Ok(Some(ProductStatus {
            is_reserved,
            is_sold,
            expires_at: if is_reserved { row.next_release } else { None },
        }))
    }

    /// The actor's live lease on a product, if any, locked-read inside the
    /// reserve transaction.
    async fn find_live_for_actor(
        tx: &mut Transaction<'_, Postgres>,
        product_id: DbId,
        actor_id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations \
             WHERE product_id = $1 AND actor_id = $2 AND status_id = $3 \
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(product_id)
            .bind(actor_id)
            .bind(ReservationStatus::Active.id())
            .fetch_optional(&mut **tx)
            .await
    }
}
