//! Role names carried in JWT claims.
//!
//! The identity provider assigns roles; this service only compares against
//! these constants.

/// Full administrative access, including cancelling any actor's reservation.
pub const ROLE_ADMIN: &str = "admin";

/// Service role for the order pipeline. The only non-admin role allowed to
/// complete a reservation.
pub const ROLE_ORDERS: &str = "orders";

/// Default role for authenticated shoppers.
pub const ROLE_SHOPPER: &str = "shopper";
