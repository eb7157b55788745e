//! The auth module's own permission vocabulary and menu contribution.
//!
//! Published over the bus at startup like any other module's manifest.

use beheer_sdk::prelude::*;

pub const MODULE: &str = "auth";

pub const ROLE_READ: &str = "auth.role.read";
pub const ROLE_WRITE: &str = "auth.role.write";
pub const ROLE_DELETE: &str = "auth.role.delete";
pub const USER_READ: &str = "auth.user.read";
pub const USER_WRITE: &str = "auth.user.write";

/// Build the auth module manifest.
pub fn manifest() -> ModuleManifest {
    ModuleManifest::new(MODULE)
        .permission(PermissionEntry::described(ROLE_READ, "View roles and the permission catalog"))
        .permission(PermissionEntry::described(ROLE_WRITE, "Create roles and grant permissions"))
        .permission(PermissionEntry::described(ROLE_DELETE, "Delete roles"))
        .permission(PermissionEntry::described(USER_READ, "View users"))
        .permission(PermissionEntry::described(USER_WRITE, "Assign roles to users"))
        .menu(
            MenuDefinition::new("core:dashboard", "Dashboard")
                .path("/dashboard")
                .icon("dashboard"),
        )
        .menu(
            MenuDefinition::new("auth:system", "System")
                .icon("settings")
                .order(90)
                .permission(ROLE_READ)
                .child(
                    MenuDefinition::new("auth:roles", "Roles")
                        .path("/system/roles")
                        .order(10)
                        .permission(ROLE_READ),
                )
                .child(
                    MenuDefinition::new("auth:permissions", "Permissions")
                        .path("/system/permissions")
                        .order(20)
                        .permission(ROLE_READ),
                ),
        )
}
