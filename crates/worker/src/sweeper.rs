//! Periodic expiration sweep over the reservation table.
//!
//! Flips `active` leases whose deadline has passed into `expired` and
//! publishes a release event per swept lease. Every read path already
//! treats lapsed leases as released, so sweep timing affects storage-scan
//! cost and event latency, never correctness.

use std::time::Duration;

use serde_json::json;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use curio_db::repositories::ReservationRepo;
use curio_events::bus::EVENT_RESERVATION_EXPIRED;
use curio_events::{EventBus, PlatformEvent};

/// How often the sweep runs unless overridden.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Run the expiration sweep loop until `cancel` is triggered.
///
/// The interval can be overridden via `SWEEP_INTERVAL_SECS`.
pub async fn run(pool: PgPool, bus: std::sync::Arc<EventBus>, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

    tracing::info!(interval_secs, "Expiration sweeper started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiration sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                sweep_once(&pool, &bus).await;
            }
        }
    }
}

/// One sweep pass: flip lapsed leases and announce the freed units.
pub async fn sweep_once(pool: &PgPool, bus: &EventBus) {
    match ReservationRepo::sweep_expired(pool).await {
        Ok(swept) => {
            if swept.is_empty() {
                tracing::debug!("Sweep: no lapsed leases");
                return;
            }
            tracing::info!(count = swept.len(), "Sweep: expired lapsed leases");
            for reservation in swept {
                bus.publish(
                    PlatformEvent::new(EVENT_RESERVATION_EXPIRED)
                        .with_source("reservation", reservation.id)
                        .with_payload(json!({
                            "product_id": reservation.product_id,
                            "quantity": reservation.quantity,
                            "expired_at": reservation.expires_at,
                        })),
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Sweep failed");
        }
    }
}
