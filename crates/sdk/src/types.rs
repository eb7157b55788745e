//! Registration payload types.
//!
//! These are the JSON shapes modules publish on the registration topics.
//! Unknown fields are ignored on decode so publishers can evolve ahead of
//! the kernel; missing required fields are decode errors.

use serde::{Deserialize, Serialize};

/// Payload of the `permissions.register` topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionsRegistered {
    /// Module that owns every listed permission.
    pub module: String,
    /// Permission identifiers, optionally with a description.
    pub permissions: Vec<PermissionEntry>,
}

/// A single permission in a registration payload.
///
/// Accepts either a bare identifier (`"cms.page.read"`) or an object with a
/// description (`{"id": "cms.page.read", "description": "Read pages"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionEntry {
    Id(String),
    Described {
        id: String,
        #[serde(default)]
        description: String,
    },
}

impl PermissionEntry {
    pub fn new(id: impl Into<String>) -> Self {
        PermissionEntry::Id(id.into())
    }

    pub fn described(id: impl Into<String>, description: impl Into<String>) -> Self {
        PermissionEntry::Described {
            id: id.into(),
            description: description.into(),
        }
    }

    /// The permission identifier.
    pub fn id(&self) -> &str {
        match self {
            PermissionEntry::Id(id) => id,
            PermissionEntry::Described { id, .. } => id,
        }
    }

    /// The description, empty when none was given.
    pub fn description(&self) -> &str {
        match self {
            PermissionEntry::Id(_) => "",
            PermissionEntry::Described { description, .. } => description,
        }
    }
}

impl From<&str> for PermissionEntry {
    fn from(id: &str) -> Self {
        PermissionEntry::new(id)
    }
}

/// Payload of the `menus.register` topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenusRegistered {
    /// Domain that owns every node in the tree.
    pub domain: String,
    /// Publisher's catalog version.
    #[serde(default = "default_version")]
    pub version: i32,
    /// Root nodes of the contributed tree.
    #[serde(alias = "menuRootNodes")]
    pub menu: Vec<MenuDefinition>,
}

fn default_version() -> i32 {
    1
}

/// A navigation node as published by a module.
///
/// Nodes nest through `children`; the kernel flattens the tree on receipt
/// and stamps `domain` and `parent_id` itself, so publishers may leave both
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDefinition {
    /// Stable, globally unique ID (`<domain>:<node>`).
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    pub label: String,
    /// Route path. Empty for pure grouping nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// Sort order among siblings (lower first).
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    /// Any one of these grants visibility. Empty = visible to everyone.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuDefinition>,
}

fn default_true() -> bool {
    true
}

impl MenuDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: String::new(),
            label: label.into(),
            path: String::new(),
            icon: String::new(),
            order: 0,
            parent_id: String::new(),
            permissions: Vec::new(),
            visible: true,
            children: Vec::new(),
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn child(mut self, child: MenuDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn permission_entries_accept_both_shapes() {
        let json = r#"{
            "module": "cms",
            "permissions": ["cms.page.read", {"id": "cms.page.write", "description": "Edit pages"}]
        }"#;

        let payload: PermissionsRegistered = serde_json::from_str(json).unwrap();
        assert_eq!(payload.module, "cms");
        assert_eq!(payload.permissions[0].id(), "cms.page.read");
        assert_eq!(payload.permissions[0].description(), "");
        assert_eq!(payload.permissions[1].id(), "cms.page.write");
        assert_eq!(payload.permissions[1].description(), "Edit pages");
    }

    #[test]
    fn permissions_payload_requires_module() {
        let err = serde_json::from_str::<PermissionsRegistered>(r#"{"permissions": []}"#);
        assert!(err.is_err());
    }

    #[test]
    fn menus_payload_ignores_unknown_fields() {
        let json = r#"{
            "domain": "cms",
            "version": 3,
            "publisher": "cms-7f9c",
            "menu": [{"id": "cms:root", "label": "CMS", "colour": "blue"}]
        }"#;

        let payload: MenusRegistered = serde_json::from_str(json).unwrap();
        assert_eq!(payload.version, 3);
        assert_eq!(payload.menu.len(), 1);
        assert!(payload.menu[0].visible);
        assert_eq!(payload.menu[0].order, 0);
    }

    #[test]
    fn menus_payload_accepts_root_nodes_alias() {
        let json = r#"{"domain": "cms", "menuRootNodes": [{"id": "cms:root", "label": "CMS"}]}"#;

        let payload: MenusRegistered = serde_json::from_str(json).unwrap();
        assert_eq!(payload.version, 1);
        assert_eq!(payload.menu[0].id, "cms:root");
    }

    #[test]
    fn menu_node_requires_label() {
        let json = r#"{"domain": "cms", "menu": [{"id": "cms:root"}]}"#;
        assert!(serde_json::from_str::<MenusRegistered>(json).is_err());
    }

    #[test]
    fn builder_nests_children() {
        let root = MenuDefinition::new("cms:root", "CMS")
            .icon("article")
            .order(20)
            .permission("cms.page.read")
            .child(MenuDefinition::new("cms:pages", "Pages").path("/cms/pages"))
            .child(MenuDefinition::new("cms:media", "Media").path("/cms/media").hidden());

        assert_eq!(root.node_count(), 3);
        assert!(!root.children[1].visible);

        let json = serde_json::to_value(&root).unwrap();
        assert!(json.get("path").is_none());
        assert_eq!(json["children"][0]["path"], "/cms/pages");
    }
}
