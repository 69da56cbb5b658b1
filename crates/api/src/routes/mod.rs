pub mod health;
pub mod products;
pub mod reservations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /products                         create (admin only)
/// /products/{id}                    stock projection row
/// /products/{id}/status             cached availability poll (public)
///
/// /reservations                     list mine, reserve
/// /reservations/{id}                get (owner or admin)
/// /reservations/{id}/cancel         release early (owner or admin)
/// /reservations/{id}/complete       finalize sale (order pipeline)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/reservations", reservations::router())
}
