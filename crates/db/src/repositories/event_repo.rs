//! Append-only repository for the `events` audit table.

use sqlx::PgPool;

use curio_core::types::{DbId, Timestamp};

/// Writes platform events for audit. Rows are never updated or deleted.
pub struct EventRepo;

impl EventRepo {
    /// Insert one event row.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_id: Option<DbId>,
        payload: &serde_json::Value,
        occurred_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO events \
                 (event_type, source_entity_type, source_entity_id, actor_id, payload, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_id)
        .bind(payload)
        .bind(occurred_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Number of stored events of a given type (used by tests and ops
    /// tooling; the table is append-only so this is monotonic).
    pub async fn count_by_type(pool: &PgPool, event_type: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE event_type = $1")
            .bind(event_type)
            .fetch_one(pool)
            .await
    }
}
