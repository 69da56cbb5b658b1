//! The availability evaluator: a pure function over stock counters and the
//! live reservation set.
//!
//! Expiry is a derived predicate (`status == active && now < expires_at`),
//! not the stored status column, so a lease whose deadline has passed stops
//! counting against stock the moment it lapses. The background sweeper only
//! tidies storage; it is never needed for a correct answer here.

use crate::types::Timestamp;

/// Reservation status id for `active` (matches `reservation_statuses` seed).
const STATUS_ACTIVE: i16 = 1;

/// Stock counters for a product, as read from the catalog projection.
#[derive(Debug, Clone, Copy)]
pub struct StockSnapshot {
    /// Total units the catalog ever listed for this product.
    pub total_stock: i32,
    /// Units already sold (completed sales).
    pub sold_quantity: i32,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// Not enough free units; `remaining` may be zero or negative-clamped.
    Insufficient { remaining: i32 },
}

/// Whether a reservation record counts as a live claim at `now`.
///
/// A record past its deadline is treated as released even when the sweeper
/// has not yet flipped its stored status.
pub fn is_live(status_id: i16, expires_at: Timestamp, now: Timestamp) -> bool {
    status_id == STATUS_ACTIVE && now < expires_at
}

/// Evaluate whether `requested` units are free, given the stock counters and
/// the summed quantity of live reservations.
///
/// Pure and side-effect-free so the lease manager can call it inside the
/// same transaction as the insert that depends on the answer.
pub fn evaluate(stock: StockSnapshot, live_reserved: i64, requested: i32) -> Availability {
    let remaining =
        i64::from(stock.total_stock) - i64::from(stock.sold_quantity) - live_reserved;
    if remaining >= i64::from(requested) {
        Availability::Available
    } else {
        Availability::Insufficient {
            remaining: remaining.clamp(0, i64::from(i32::MAX)) as i32,
        }
    }
}
