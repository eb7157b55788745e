//! Permission-filtered navigation tree composition.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::MenuDefinition;

/// A node of the composed navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

/// Build the navigation tree visible to a holder of `permissions`.
///
/// Siblings are ordered by `order`, then label, then ID. A node is dropped
/// when it is invisible, when it lists permissions and the caller holds
/// none of them, or when it is a path-less container left without children.
/// Nodes whose parent is absent from `defs` are never reached.
pub fn compose_menu(defs: &[MenuDefinition], permissions: &HashSet<String>) -> Vec<MenuNode> {
    let mut by_parent: HashMap<&str, Vec<&MenuDefinition>> = HashMap::new();
    for def in defs {
        by_parent.entry(def.parent_id.as_str()).or_default().push(def);
    }

    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    let mut visited = HashSet::new();
    build_level(&by_parent, "", permissions, &mut visited)
}

fn build_level<'a>(
    by_parent: &HashMap<&str, Vec<&'a MenuDefinition>>,
    parent_id: &str,
    permissions: &HashSet<String>,
    visited: &mut HashSet<&'a str>,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.get(parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for &def in siblings {
        if !def.visible || !is_permitted(def, permissions) {
            continue;
        }
        // Guards against a definition listing itself as an ancestor
        if !visited.insert(def.id.as_str()) {
            continue;
        }

        let children = build_level(by_parent, &def.id, permissions, visited);
        if children.is_empty() && def.is_container() {
            continue;
        }

        nodes.push(MenuNode {
            label: def.label.clone(),
            path: def.path.clone(),
            icon: def.icon.clone(),
            children,
        });
    }

    nodes
}

fn is_permitted(def: &MenuDefinition, permissions: &HashSet<String>) -> bool {
    def.permissions.is_empty() || def.permissions.iter().any(|p| permissions.contains(p))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn def(id: &str, label: &str, parent: &str, path: Option<&str>, order: i32) -> MenuDefinition {
        MenuDefinition {
            id: id.to_string(),
            domain: "test".to_string(),
            label: label.to_string(),
            path: path.map(str::to_string),
            icon: None,
            order,
            parent_id: parent.to_string(),
            permissions: Vec::new(),
            visible: true,
        }
    }

    fn with_perms(mut def: MenuDefinition, perms: &[&str]) -> MenuDefinition {
        def.permissions = perms.iter().map(|p| p.to_string()).collect();
        def
    }

    fn perms(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|p| p.to_string()).collect()
    }

    fn leaf(label: &str, path: &str) -> MenuNode {
        MenuNode {
            label: label.to_string(),
            path: Some(path.to_string()),
            icon: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn filters_and_orders() {
        let defs = vec![
            def("dashboard", "Dashboard", "", Some("/dashboard"), 0),
            def("root", "Root", "", None, 10),
            def("a", "A", "root", Some("/a"), 20),
            with_perms(def("b", "B", "root", Some("/b"), 10), &["p.read"]),
            with_perms(def("c", "C", "root", Some("/c"), 30), &["p.hidden"]),
        ];

        let menu = compose_menu(&defs, &perms(&["p.read"]));

        assert_eq!(
            menu,
            vec![
                leaf("Dashboard", "/dashboard"),
                MenuNode {
                    label: "Root".to_string(),
                    path: None,
                    icon: None,
                    children: vec![leaf("B", "/b"), leaf("A", "/a")],
                },
            ]
        );
    }

    #[test]
    fn empty_container_is_pruned() {
        let defs = vec![
            def("root", "Root", "", None, 0),
            with_perms(def("a", "A", "root", Some("/a"), 0), &["x"]),
        ];

        assert!(compose_menu(&defs, &HashSet::new()).is_empty());
    }

    #[test]
    fn leaf_with_path_survives_without_children() {
        let defs = vec![def("settings", "Settings", "", Some("/settings"), 0)];
        assert_eq!(compose_menu(&defs, &HashSet::new()), vec![leaf("Settings", "/settings")]);
    }

    #[test]
    fn any_listed_permission_grants_visibility() {
        let defs = vec![with_perms(
            def("roles", "Roles", "", Some("/roles"), 0),
            &["auth.role.read", "auth.role.write"],
        )];

        assert_eq!(compose_menu(&defs, &perms(&["auth.role.write"])).len(), 1);
        assert!(compose_menu(&defs, &perms(&["cms.page.read"])).is_empty());
    }

    #[test]
    fn invisible_node_hides_its_subtree() {
        let mut parent = def("p", "Parent", "", Some("/p"), 0);
        parent.visible = false;
        let defs = vec![parent, def("c", "Child", "p", Some("/c"), 0)];

        assert!(compose_menu(&defs, &HashSet::new()).is_empty());
    }

    #[test]
    fn ties_break_by_label_then_id() {
        let defs = vec![
            def("z", "Same", "", Some("/z"), 5),
            def("b", "Beta", "", Some("/b"), 5),
            def("a", "Same", "", Some("/a"), 5),
        ];

        let paths: Vec<_> = compose_menu(&defs, &HashSet::new())
            .into_iter()
            .filter_map(|n| n.path)
            .collect();
        assert_eq!(paths, vec!["/b", "/a", "/z"]);
    }

    #[test]
    fn orphans_are_never_emitted() {
        let defs = vec![
            def("home", "Home", "", Some("/"), 0),
            def("lost", "Lost", "missing-parent", Some("/lost"), 0),
        ];

        assert_eq!(compose_menu(&defs, &HashSet::new()), vec![leaf("Home", "/")]);
    }

    #[test]
    fn self_parent_cycle_terminates() {
        let defs = vec![
            def("loop", "Loop", "", None, 0),
            def("loop", "Loop again", "loop", Some("/loop"), 0),
        ];

        let menu = compose_menu(&defs, &HashSet::new());
        assert!(menu.is_empty());
    }

    #[test]
    fn serialization_omits_empty_fields() {
        let node = MenuNode {
            label: "Root".to_string(),
            path: None,
            icon: None,
            children: vec![leaf("A", "/a")],
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"label": "Root", "children": [{"label": "A", "path": "/a"}]})
        );
    }
}
