//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod product_repo;
pub mod reservation_repo;

pub use event_repo::EventRepo;
pub use product_repo::ProductRepo;
pub use reservation_repo::{ReservationRepo, ReserveOutcome};
