use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The product has no free units. An expected business outcome, not a
    /// system fault; `remaining` reports how many units are still open.
    #[error("Product unavailable: {remaining} unit(s) remaining")]
    Unavailable { remaining: i32 },

    /// The reservation is no longer active (expired, cancelled, or
    /// completed), so the requested transition is not permitted.
    #[error("{entity} with id {id} is no longer active")]
    AlreadyTerminal { entity: &'static str, id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
