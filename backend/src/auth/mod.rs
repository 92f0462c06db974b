//! Bearer-token authentication and role guards.

pub mod guard;
pub mod jwks;

pub use guard::{require_authenticated, require_moderator};
pub use jwks::{AuthError, AuthUser, JwksClient};
