//! Background housekeeping for the reservation service.
//!
//! The sweeper loop is a library so the API process can spawn it in-process
//! and the `curio-sweeper` binary can run it as its own deployment unit.

pub mod sweeper;
