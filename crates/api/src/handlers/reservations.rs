//! Handlers for the `/reservations` resource.
//!
//! Reserving requires an authenticated actor; guest sessions can browse
//! and poll status but never hold a lease. All mutation outcomes publish a
//! platform event and drop the product's cached status so the next poll
//! sees the transition.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use curio_core::error::CoreError;
use curio_core::lease;
use curio_core::roles::{ROLE_ADMIN, ROLE_ORDERS};
use curio_core::types::DbId;
use curio_db::models::reservation::{CompleteRequest, Reservation, ReserveRequest};
use curio_db::repositories::{ReservationRepo, ReserveOutcome};
use curio_db::retry::with_retry;
use curio_events::bus::{
    EVENT_RESERVATION_CANCELLED, EVENT_RESERVATION_COMPLETED, EVENT_RESERVATION_CREATED,
};
use curio_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a reservation by ID and verify the caller owns it (or is admin).
///
/// Returns `NotFound` if the reservation does not exist, `Forbidden` if the
/// caller is not the owner and is not an admin. `action` is used in the
/// error message (e.g. "view", "cancel").
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    reservation_id: DbId,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Reservation> {
    let reservation = ReservationRepo::find_by_id(pool, reservation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Reservation",
            id: reservation_id,
        }))?;

    if reservation.actor_id != auth.actor_id && auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another actor's reservation"
        ))));
    }

    Ok(reservation)
}

// ---------------------------------------------------------------------------
// Reserve
// ---------------------------------------------------------------------------

/// POST /api/v1/reservations
///
/// Claim a lease on a product. Returns 201 with the new lease, or 200 with
/// the existing lease when the actor already holds one on this product
/// (double-clicks are idempotent). A product with no free units yields
/// 409 `UNAVAILABLE` -- an expected outcome, the shopper should move on,
/// not retry.
pub async fn reserve(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ReserveRequest>,
) -> AppResult<impl IntoResponse> {
    let quantity = input.quantity.unwrap_or(1);
    lease::validate_quantity(quantity)?;
    let lease_mins = lease::resolve_lease_mins(input.lease_duration_mins)?;

    let outcome = ReservationRepo::reserve(
        &state.pool,
        input.product_id,
        auth.actor_id,
        auth.session_id,
        quantity,
        lease_mins,
    )
    .await?;

    match outcome {
        ReserveOutcome::Granted(reservation) => {
            state.status_cache.invalidate(reservation.product_id).await;
            state.event_bus.publish(
                PlatformEvent::new(EVENT_RESERVATION_CREATED)
                    .with_source("reservation", reservation.id)
                    .with_actor(auth.actor_id)
                    .with_payload(json!({
                        "product_id": reservation.product_id,
                        "quantity": reservation.quantity,
                        "expires_at": reservation.expires_at,
                    })),
            );

            tracing::info!(
                reservation_id = reservation.id,
                product_id = reservation.product_id,
                actor_id = auth.actor_id,
                expires_at = %reservation.expires_at,
                "Reservation granted",
            );

            Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
        }
        ReserveOutcome::AlreadyHeld(reservation) => {
            tracing::debug!(
                reservation_id = reservation.id,
                actor_id = auth.actor_id,
                "Re-reserve returned the held lease",
            );
            Ok((StatusCode::OK, Json(DataResponse { data: reservation })))
        }
        ReserveOutcome::Insufficient { remaining } => {
            Err(AppError::Core(CoreError::Unavailable { remaining }))
        }
        ReserveOutcome::UnknownProduct => Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: input.product_id,
        })),
    }
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// GET /api/v1/reservations
///
/// The caller's live reservations, soonest deadline first. Backs the
/// "my reservations" view; each entry's `expires_at` seeds a local
/// countdown.
pub async fn list_my_reservations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reservations =
        with_retry(|| ReservationRepo::list_live_by_actor(&state.pool, auth.actor_id)).await?;

    Ok(Json(DataResponse { data: reservations }))
}

/// GET /api/v1/reservations/{id}
///
/// Get a single reservation. Actors see only their own; admins any.
pub async fn get_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(reservation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reservation = find_and_authorize(&state.pool, reservation_id, &auth, "view").await?;
    Ok(Json(DataResponse { data: reservation }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/reservations/{id}/cancel
///
/// Release a lease early. Owner or admin only. Returns 204 on success,
/// 409 `ALREADY_TERMINAL` if the lease already left the active state --
/// including a lease whose deadline passed but which the sweeper has not
/// flipped yet (cancelling a logically dead lease must not "succeed").
pub async fn cancel_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(reservation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, reservation_id, &auth, "cancel").await?;

    let cancelled = ReservationRepo::cancel(&state.pool, reservation_id)
        .await?
        .ok_or(AppError::Core(CoreError::AlreadyTerminal {
            entity: "Reservation",
            id: reservation_id,
        }))?;

    state.status_cache.invalidate(cancelled.product_id).await;
    state.event_bus.publish(
        PlatformEvent::new(EVENT_RESERVATION_CANCELLED)
            .with_source("reservation", cancelled.id)
            .with_actor(auth.actor_id)
            .with_payload(json!({ "product_id": cancelled.product_id })),
    );

    tracing::info!(
        reservation_id,
        actor_id = auth.actor_id,
        "Reservation cancelled",
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Complete
// ---------------------------------------------------------------------------

/// POST /api/v1/reservations/{id}/complete
///
/// Called by the order pipeline once payment settled; stamps `order_id`
/// and folds the units into the product's sold count. Restricted to the
/// `orders` service role and admins. 409 `ALREADY_TERMINAL` when the lease
/// is not live -- the pipeline must treat that as "reservation lost" and
/// must not charge.
pub async fn complete_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(reservation_id): Path<DbId>,
    Json(input): Json<CompleteRequest>,
) -> AppResult<impl IntoResponse> {
    if auth.role != ROLE_ORDERS && auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the order pipeline can complete reservations".into(),
        )));
    }

    // Distinguish a missing lease from a dead one up front.
    ReservationRepo::find_by_id(&state.pool, reservation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Reservation",
            id: reservation_id,
        }))?;

    let completed = ReservationRepo::complete(&state.pool, reservation_id, input.order_id)
        .await?
        .ok_or(AppError::Core(CoreError::AlreadyTerminal {
            entity: "Reservation",
            id: reservation_id,
        }))?;

    state.status_cache.invalidate(completed.product_id).await;
    state.event_bus.publish(
        PlatformEvent::new(EVENT_RESERVATION_COMPLETED)
            .with_source("reservation", completed.id)
            .with_actor(completed.actor_id)
            .with_payload(json!({
                "product_id": completed.product_id,
                "order_id": input.order_id,
            })),
    );

    tracing::info!(
        reservation_id,
        order_id = input.order_id,
        "Reservation completed",
    );

    Ok(Json(DataResponse { data: completed }))
}
