//! Integration test for durable event capture.

use sqlx::PgPool;

use curio_db::repositories::EventRepo;
use curio_events::bus::EVENT_RESERVATION_CREATED;
use curio_events::{EventBus, EventPersistence, PlatformEvent};

#[sqlx::test(migrations = "../../db/migrations")]
async fn published_events_land_in_the_audit_table(pool: PgPool) {
    let bus = EventBus::default();
    let handle = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(
        PlatformEvent::new(EVENT_RESERVATION_CREATED)
            .with_source("reservation", 42)
            .with_actor(10)
            .with_payload(serde_json::json!({ "product_id": 7 })),
    );

    // Closing the bus drains the subscriber and ends the task.
    drop(bus);
    handle.await.expect("persistence task should exit cleanly");

    let count = EventRepo::count_by_type(&pool, EVENT_RESERVATION_CREATED)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
