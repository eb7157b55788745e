//! Module manifest: everything a module announces at boot.

use crate::types::{MenuDefinition, MenusRegistered, PermissionEntry, PermissionsRegistered};

/// A module's permission catalog and menu contribution.
///
/// The module name doubles as the menu domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleManifest {
    pub module: String,
    pub version: i32,
    pub permissions: Vec<PermissionEntry>,
    pub menu: Vec<MenuDefinition>,
}

impl ModuleManifest {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: 1,
            permissions: Vec::new(),
            menu: Vec::new(),
        }
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn permission(mut self, entry: impl Into<PermissionEntry>) -> Self {
        self.permissions.push(entry.into());
        self
    }

    pub fn menu(mut self, root: MenuDefinition) -> Self {
        self.menu.push(root);
        self
    }

    /// Payload for the `permissions.register` topic.
    pub fn permissions_payload(&self) -> PermissionsRegistered {
        PermissionsRegistered {
            module: self.module.clone(),
            permissions: self.permissions.clone(),
        }
    }

    /// Payload for the `menus.register` topic.
    pub fn menus_payload(&self) -> MenusRegistered {
        MenusRegistered {
            domain: self.module.clone(),
            version: self.version,
            menu: self.menu.clone(),
        }
    }

    /// JSON-encoded permissions payload.
    pub fn encode_permissions(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.permissions_payload())
    }

    /// JSON-encoded menus payload.
    pub fn encode_menus(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.menus_payload())
    }
}
