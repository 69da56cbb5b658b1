//! Lease policy constants and the reservation state machine.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the sweeper without pulling in sqlx.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Policy constants
// ---------------------------------------------------------------------------

/// Default lease duration when the caller does not specify one.
pub const DEFAULT_LEASE_MINS: i64 = 15;

/// Shortest lease a caller may request.
pub const MIN_LEASE_MINS: i64 = 1;

/// Longest lease a caller may request. A renewed claim is a new record, so
/// this also bounds how long a single record can hold a unit.
pub const MAX_LEASE_MINS: i64 = 60;

/// Validate a requested lease duration against policy bounds, applying the
/// default when absent.
pub fn resolve_lease_mins(requested: Option<i64>) -> Result<i64, CoreError> {
    let mins = requested.unwrap_or(DEFAULT_LEASE_MINS);
    if !(MIN_LEASE_MINS..=MAX_LEASE_MINS).contains(&mins) {
        return Err(CoreError::Validation(format!(
            "lease_duration_mins must be between {MIN_LEASE_MINS} and {MAX_LEASE_MINS}, got {mins}"
        )));
    }
    Ok(mins)
}

/// Validate a requested quantity. For one-of-a-kind items this is always 1,
/// but multi-unit products are modeled.
pub fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Reservation status IDs matching `reservation_statuses` seed data
/// (1-based SMALLSERIAL).
///
/// The id values are intentionally duplicated from the `db` crate's
/// `ReservationStatus` enum because `core` must have zero internal deps.
pub mod state_machine {
    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// `active` (1) may move to `expired` (2), `completed` (3), or
    /// `cancelled` (4). All three targets are terminal and return an empty
    /// slice; nothing ever re-enters `active`.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Active -> Expired, Completed, Cancelled
            1 => &[2, 3, 4],
            // Terminal states: Expired, Completed, Cancelled
            2 | 3 | 4 => &[],
            // Unknown status: no transitions allowed
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Whether a status is terminal (no further transitions permitted).
    pub fn is_terminal(status: i16) -> bool {
        matches!(status, 2 | 3 | 4)
    }
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::*;

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    #[test]
    fn active_to_expired() {
        assert!(can_transition(1, 2));
    }

    #[test]
    fn active_to_completed() {
        assert!(can_transition(1, 3));
    }

    #[test]
    fn active_to_cancelled() {
        assert!(can_transition(1, 4));
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        for status in [2, 3, 4] {
            assert!(valid_transitions(status).is_empty());
            assert!(is_terminal(status));
        }
    }

    #[test]
    fn nothing_reenters_active() {
        for from in [2, 3, 4] {
            assert!(!can_transition(from, 1));
        }
    }

    #[test]
    fn unknown_status_has_no_transitions() {
        assert!(valid_transitions(0).is_empty());
        assert!(valid_transitions(99).is_empty());
    }

    // -----------------------------------------------------------------------
    // Policy
    // -----------------------------------------------------------------------

    #[test]
    fn default_lease_applies_when_unspecified() {
        assert_eq!(resolve_lease_mins(None).unwrap(), DEFAULT_LEASE_MINS);
    }

    #[test]
    fn lease_within_bounds_accepted() {
        assert_eq!(resolve_lease_mins(Some(1)).unwrap(), 1);
        assert_eq!(resolve_lease_mins(Some(60)).unwrap(), 60);
    }

    #[test]
    fn lease_outside_bounds_rejected() {
        assert!(resolve_lease_mins(Some(0)).is_err());
        assert!(resolve_lease_mins(Some(61)).is_err());
        assert!(resolve_lease_mins(Some(-5)).is_err());
    }

    #[test]
    fn zero_quantity_rejected() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1).is_ok());
    }
}
