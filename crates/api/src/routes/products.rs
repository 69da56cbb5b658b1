//! Route definitions for the `/products` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// POST   /              -> create_product (admin)
/// GET    /{id}          -> get_product
/// GET    /{id}/status   -> product_status (public, cached)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create_product))
        .route("/{id}", get(products::get_product))
        .route("/{id}/status", get(products::product_status))
}
