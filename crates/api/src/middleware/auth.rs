//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use curio_core::error::CoreError;
use curio_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated actor extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Reservation ownership is keyed on `actor_id`; the optional
/// `x-session-id` header is a guest-browsing correlation key carried into
/// the record, never an ownership credential. Anonymous requests (no
/// Bearer token) are rejected, which is what makes unauthenticated
/// reserve attempts fail with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The actor's internal database id (from `claims.sub`).
    pub actor_id: DbId,
    /// The actor's role name (e.g. `"shopper"`, `"orders"`, `"admin"`).
    pub role: String,
    /// Browsing-session correlation key, if the client sent one.
    pub session_id: Option<Uuid>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let session_id = parts
            .headers
            .get("x-session-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok());

        Ok(AuthUser {
            actor_id: claims.sub,
            role: claims.role,
            session_id,
        })
    }
}
