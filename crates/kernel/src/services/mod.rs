//! Kernel services.
//!
//! The auth service owns every operation the HTTP routes and the
//! registration listener perform; token handling is split out so the bearer
//! middleware can verify without touching the store.

pub mod auth;
pub mod token;

pub use auth::{AuthService, Registration};
pub use token::{SessionClaims, TokenService};
