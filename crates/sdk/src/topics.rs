//! Registration topic names.

/// Topic carrying a module's permission catalog.
pub const PERMISSIONS_REGISTER: &str = "permissions.register";

/// Topic carrying a module's navigation contribution.
pub const MENUS_REGISTER: &str = "menus.register";

/// All topics the authorization kernel listens on.
pub const ALL: [&str; 2] = [PERMISSIONS_REGISTER, MENUS_REGISTER];
