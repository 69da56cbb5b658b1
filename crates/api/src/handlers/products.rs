//! Handlers for the `/products` resource.
//!
//! The product catalog itself (price, title, images) is external; these
//! endpoints manage the stock projection and serve the cached availability
//! status that product pages poll.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use curio_core::error::CoreError;
use curio_core::roles::ROLE_ADMIN;
use curio_core::types::DbId;
use curio_db::models::product::CreateProduct;
use curio_db::repositories::{ProductRepo, ReservationRepo};
use curio_db::retry::with_retry;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/products
///
/// Register a product stock row (admin only). Returns 201 with the row.
pub async fn create_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<impl IntoResponse> {
    if auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only admins can register products".into(),
        )));
    }

    if input.total_stock.is_some_and(|s| s < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "total_stock must not be negative".into(),
        )));
    }

    let product = ProductRepo::create(&state.pool, &input).await?;

    tracing::info!(
        product_id = product.id,
        total_stock = product.total_stock,
        "Product registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// GET /api/v1/products/{id}
///
/// Fetch the stock projection row for a product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let product = ProductRepo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }))?;

    Ok(Json(DataResponse { data: product }))
}

/// GET /api/v1/products/{id}/status
///
/// Public availability poll, served through the status cache. Within the
/// cache TTL all viewers of a product share one store read; concurrent
/// misses coalesce into a single query.
pub async fn product_status(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let status = state
        .status_cache
        .get_or_fetch(product_id, || async move {
            with_retry(|| ReservationRepo::product_status(&pool, product_id)).await
        })
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }))?;

    Ok(Json(DataResponse { data: status }))
}
