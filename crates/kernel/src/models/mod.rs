//! Database models.

pub mod menu_definition;
pub mod organization;
pub mod permission;
pub mod role;
pub mod user;

pub use menu_definition::MenuDefinition;
pub use organization::{Membership, MembershipRole, Organization};
pub use permission::{NewPermission, Permission};
pub use role::Role;
pub use user::{NewUser, User};
