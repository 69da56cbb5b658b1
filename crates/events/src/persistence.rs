//! Durable capture of bus traffic into the `events` table.
//!
//! Runs as a spawned task holding one bus subscription. Losing the channel
//! (sender dropped) ends the task; a lagged receiver logs and keeps going,
//! since the audit trail tolerates gaps better than a wedged service.

use sqlx::PgPool;
use tokio::sync::broadcast;

use curio_db::repositories::EventRepo;

use crate::bus::PlatformEvent;

/// Background writer persisting every published [`PlatformEvent`].
pub struct EventPersistence;

impl EventPersistence {
    /// Consume `rx` until the bus closes, inserting one row per event.
    pub async fn run(pool: PgPool, mut rx: broadcast::Receiver<PlatformEvent>) {
        tracing::info!("Event persistence started");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = EventRepo::insert(
                        &pool,
                        &event.event_type,
                        event.source_entity_type.as_deref(),
                        event.source_entity_id,
                        event.actor_id,
                        &event.payload,
                        event.timestamp,
                    )
                    .await
                    {
                        tracing::error!(
                            event_type = %event.event_type,
                            error = %e,
                            "Failed to persist event",
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event persistence lagged; events dropped from audit");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence stopping");
                    break;
                }
            }
        }
    }
}
