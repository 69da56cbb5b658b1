//! Short-TTL read-through cache for product status queries.
//!
//! Many viewers of a product page poll status independently; within the TTL
//! they all share one answer, and concurrent misses for the same product
//! coalesce into a single store query. The cache is derived state only --
//! the store stays the source of truth, and dropping the whole map at any
//! time is always safe.
//!
//! A cached "reserved" answer is not served past its own `expires_at`:
//! deadline passage invalidates the entry at read time, so a claim never
//! outlives its real deadline by more than one poll.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};

use curio_core::types::DbId;
use curio_db::models::reservation::ProductStatus;

/// One cache slot: either a resolved answer or an in-flight fetch that
/// followers can wait on.
enum Slot {
    Fresh {
        value: ProductStatus,
        fetched_at: Instant,
    },
    InFlight(broadcast::Sender<Option<ProductStatus>>),
}

/// What the locked lookup decided to do.
enum Lookup {
    Hit(ProductStatus),
    Wait(broadcast::Receiver<Option<ProductStatus>>),
    Refresh,
}

/// Read-through status cache keyed by product id.
pub struct StatusCache {
    ttl: Duration,
    slots: Mutex<HashMap<DbId, Slot>>,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached status or fetch it through `fetch`.
    ///
    /// `fetch` resolving to `None` means the product does not exist; that
    /// answer is not cached. Concurrent callers during a miss wait on the
    /// first caller's result; if that caller's fetch fails they fall back
    /// to their own direct fetch rather than failing on someone else's
    /// error.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        product_id: DbId,
        fetch: F,
    ) -> Result<Option<ProductStatus>, sqlx::Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<ProductStatus>, sqlx::Error>>,
    {
        let mut slots = self.slots.lock().await;

        let lookup = match slots.get(&product_id) {
            Some(Slot::Fresh { value, fetched_at }) => {
                let deadline_passed = value.expires_at.is_some_and(|d| Utc::now() >= d);
                if fetched_at.elapsed() < self.ttl && !deadline_passed {
                    Lookup::Hit(value.clone())
                } else {
                    Lookup::Refresh
                }
            }
            Some(Slot::InFlight(tx)) => Lookup::Wait(tx.subscribe()),
            None => Lookup::Refresh,
        };

        match lookup {
            Lookup::Hit(value) => Ok(Some(value)),

            Lookup::Wait(mut rx) => {
                drop(slots);
                match rx.recv().await {
                    Ok(value) => Ok(value),
                    // The leading fetch failed; try for ourselves.
                    Err(_) => fetch().await,
                }
            }

            Lookup::Refresh => {
                let (tx, _) = broadcast::channel(1);
                slots.insert(product_id, Slot::InFlight(tx.clone()));
                drop(slots);

                match fetch().await {
                    Ok(value) => {
                        let mut slots = self.slots.lock().await;
                        match &value {
                            Some(status) => {
                                slots.insert(
                                    product_id,
                                    Slot::Fresh {
                                        value: status.clone(),
                                        fetched_at: Instant::now(),
                                    },
                                );
                            }
                            None => {
                                slots.remove(&product_id);
                            }
                        }
                        drop(slots);
                        let _ = tx.send(value.clone());
                        Ok(value)
                    }
                    Err(e) => {
                        let mut slots = self.slots.lock().await;
                        if matches!(slots.get(&product_id), Some(Slot::InFlight(_))) {
                            slots.remove(&product_id);
                        }
                        // Dropping `tx` wakes waiters with a closed channel.
                        Err(e)
                    }
                }
            }
        }
    }

    /// Drop the cached entry for a product. Called after every mutation so
    /// the next poll observes the transition immediately.
    pub async fn invalidate(&self, product_id: DbId) {
        self.slots.lock().await.remove(&product_id);
    }
}
