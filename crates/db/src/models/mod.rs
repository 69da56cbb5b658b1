//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` request DTO for inserts or transitions

pub mod product;
pub mod reservation;
pub mod status;
