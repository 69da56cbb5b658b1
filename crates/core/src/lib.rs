//! Domain logic for the curio reservation service.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the API, the sweeper, and any future CLI tooling.

pub mod availability;
pub mod countdown;
pub mod error;
pub mod lease;
pub mod roles;
pub mod types;
