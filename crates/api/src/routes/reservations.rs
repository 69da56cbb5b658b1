//! Route definitions for the `/reservations` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// GET    /                 -> list_my_reservations
/// POST   /                 -> reserve
/// GET    /{id}             -> get_reservation
/// POST   /{id}/cancel      -> cancel_reservation
/// POST   /{id}/complete    -> complete_reservation (order pipeline)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(reservations::list_my_reservations).post(reservations::reserve),
        )
        .route("/{id}", get(reservations::get_reservation))
        .route("/{id}/cancel", post(reservations::cancel_reservation))
        .route("/{id}/complete", post(reservations::complete_reservation))
}
