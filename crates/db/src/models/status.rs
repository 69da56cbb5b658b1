//! Status helper enum mapping to the SMALLSERIAL lookup table.
//!
//! Variant discriminants match the seed data order (1-based) in the
//! `reservation_statuses` table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Reservation lease lifecycle status.
///
/// `Active` is the only non-terminal state; see
/// `curio_core::lease::state_machine` for the allowed transitions.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Active = 1,
    Expired = 2,
    Completed = 3,
    Cancelled = 4,
}

impl ReservationStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }
}

impl From<ReservationStatus> for StatusId {
    fn from(value: ReservationStatus) -> Self {
        value as StatusId
    }
}
