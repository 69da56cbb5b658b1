//! Standalone expiration sweeper.
//!
//! Deploys the sweep loop outside the API process. Running it alongside an
//! API instance that also sweeps is harmless: the sweep UPDATE is
//! idempotent.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curio_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curio_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = curio_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    curio_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // Standalone mode has no in-process subscribers; events still reach the
    // audit table through the persistence task.
    let bus = Arc::new(EventBus::default());
    let persistence_handle = tokio::spawn(curio_events::EventPersistence::run(
        pool.clone(),
        bus.subscribe(),
    ));

    let cancel = CancellationToken::new();
    let sweeper = tokio::spawn(curio_worker::sweeper::run(
        pool.clone(),
        Arc::clone(&bus),
        cancel.clone(),
    ));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Received SIGINT, stopping sweeper");

    cancel.cancel();
    let _ = sweeper.await;

    drop(bus);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), persistence_handle).await;

    tracing::info!("Sweeper shut down");
}
