use std::sync::Arc;

use crate::cache::StatusCache;
use crate::config::ServerConfig;

use curio_events::EventBus;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: curio_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Read-through cache in front of product status queries.
    pub status_cache: Arc<StatusCache>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
}
