//! Client-side countdown projection over a fetched lease deadline.
//!
//! Product pages poll `GET /products/{id}/status` on a coarse interval and
//! tick the remaining time locally once per second from the single
//! `expires_at` they fetched. On reaching zero the projector flips its own
//! reserved flag and asks for a fresh poll, since local clocks drift from
//! the server's.

use crate::types::Timestamp;

/// One rendered tick of the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Whether the projector still considers the product claimed.
    pub is_reserved: bool,
    /// Remaining whole seconds, zero once lapsed.
    pub remaining_secs: i64,
    /// `mm:ss` display string, `"00:00"` once lapsed.
    pub display: String,
}

/// Local countdown state derived from one status fetch.
#[derive(Debug, Clone)]
pub struct CountdownProjector {
    expires_at: Option<Timestamp>,
    is_reserved: bool,
    needs_refresh: bool,
}

impl CountdownProjector {
    /// Start projecting from a fetched status. `expires_at` of `None` means
    /// the product was not reserved at fetch time.
    pub fn new(is_reserved: bool, expires_at: Option<Timestamp>) -> Self {
        Self {
            expires_at,
            is_reserved,
            needs_refresh: false,
        }
    }

    /// Advance the projection to `now` (called on a 1-second timer).
    ///
    /// The first tick at or past the deadline flips `is_reserved` locally
    /// and marks the projection stale so the caller re-polls the server.
    pub fn tick(&mut self, now: Timestamp) -> Projection {
        let remaining_secs = match self.expires_at {
            Some(deadline) if self.is_reserved => (deadline - now).num_seconds().max(0),
            _ => 0,
        };

        if self.is_reserved && remaining_secs == 0 && self.expires_at.is_some() {
            self.is_reserved = false;
            self.needs_refresh = true;
        }

        Projection {
            is_reserved: self.is_reserved,
            remaining_secs,
            display: format_mm_ss(remaining_secs),
        }
    }

    /// Whether the local flip has invalidated the cached status, so the
    /// caller should re-fetch and [`reconcile`](Self::reconcile).
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Replace local state with a freshly fetched server answer.
    pub fn reconcile(&mut self, is_reserved: bool, expires_at: Option<Timestamp>) {
        self.is_reserved = is_reserved;
        self.expires_at = expires_at;
        self.needs_refresh = false;
    }
}

/// Format whole seconds as `mm:ss`. Durations of an hour or more keep
/// accumulating minutes (`75:00`) rather than rolling over.
pub fn format_mm_ss(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(59), "00:59");
        assert_eq!(format_mm_ss(60), "01:00");
        assert_eq!(format_mm_ss(899), "14:59");
        assert_eq!(format_mm_ss(3600), "60:00");
        assert_eq!(format_mm_ss(-5), "00:00");
    }

    #[test]
    fn ticks_down_without_repolling() {
        let deadline = t0() + Duration::minutes(15);
        let mut projector = CountdownProjector::new(true, Some(deadline));

        let p = projector.tick(t0());
        assert_eq!(p.remaining_secs, 900);
        assert_eq!(p.display, "15:00");
        assert!(p.is_reserved);

        let p = projector.tick(t0() + Duration::seconds(1));
        assert_eq!(p.display, "14:59");
        assert!(!projector.needs_refresh());
    }

    #[test]
    fn flips_reserved_flag_at_zero_and_requests_refresh() {
        let deadline = t0() + Duration::seconds(2);
        let mut projector = CountdownProjector::new(true, Some(deadline));

        let p = projector.tick(t0() + Duration::seconds(2));
        assert!(!p.is_reserved);
        assert_eq!(p.display, "00:00");
        assert!(projector.needs_refresh());

        // Subsequent ticks stay flipped.
        let p = projector.tick(t0() + Duration::seconds(3));
        assert!(!p.is_reserved);
    }

    #[test]
    fn reconcile_replaces_local_state() {
        let deadline = t0() + Duration::seconds(1);
        let mut projector = CountdownProjector::new(true, Some(deadline));
        projector.tick(t0() + Duration::seconds(1));
        assert!(projector.needs_refresh());

        // Server says another actor re-reserved the item.
        let new_deadline = t0() + Duration::minutes(10);
        projector.reconcile(true, Some(new_deadline));
        assert!(!projector.needs_refresh());

        let p = projector.tick(t0() + Duration::minutes(1));
        assert!(p.is_reserved);
        assert_eq!(p.display, "09:00");
    }

    #[test]
    fn unreserved_product_projects_zero() {
        let mut projector = CountdownProjector::new(false, None);
        let p = projector.tick(t0());
        assert!(!p.is_reserved);
        assert_eq!(p.display, "00:00");
        assert!(!projector.needs_refresh());
    }
}
