//! Beheer Module SDK
//!
//! Types shared between feature modules and the authorization kernel.
//! Modules describe their permission vocabulary and navigation contribution
//! with these types and publish them on the registration topics at boot.

pub mod manifest;
pub mod topics;
pub mod types;

// Re-export serde_json so publishers can encode payloads without a direct dependency
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::manifest::ModuleManifest;
    pub use crate::topics::{MENUS_REGISTER, PERMISSIONS_REGISTER};
    pub use crate::types::*;
}
