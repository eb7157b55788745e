//! Module registration over the message bus.
//!
//! Modules publish their permission catalog on `permissions.register` and
//! their navigation tree on `menus.register`; the listener persists both.

pub mod handlers;
pub mod listener;
pub mod publisher;

pub use handlers::{
    RegistrationError, RegistrationSummary, dispatch, handle_menus_message,
    handle_permissions_message,
};
pub use listener::RegistrationListener;
pub use publisher::{
    Delivery, PublishReceipt, announce_manifest, publish_manifest, register_locally,
};
