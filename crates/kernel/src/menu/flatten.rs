//! Conversion of published menu trees into flat stored definitions.

use beheer_sdk::types::MenuDefinition as WireMenuDefinition;

use crate::models::MenuDefinition;

/// Flatten a published tree in pre-order.
///
/// Every node is stamped with `domain` and the ID of its immediate parent
/// (empty for roots), so a parent always precedes its children in the
/// output. Empty `path` and `icon` strings become `None`.
pub fn flatten_menu(domain: &str, roots: &[WireMenuDefinition]) -> Vec<MenuDefinition> {
    let mut flat = Vec::with_capacity(roots.iter().map(WireMenuDefinition::node_count).sum());
    for root in roots {
        push_subtree(domain, "", root, &mut flat);
    }
    flat
}

fn push_subtree(
    domain: &str,
    parent_id: &str,
    node: &WireMenuDefinition,
    out: &mut Vec<MenuDefinition>,
) {
    out.push(MenuDefinition {
        id: node.id.clone(),
        domain: domain.to_string(),
        label: node.label.clone(),
        path: non_empty(&node.path),
        icon: non_empty(&node.icon),
        order: node.order,
        parent_id: parent_id.to_string(),
        permissions: node.permissions.clone(),
        visible: node.visible,
    });

    for child in &node.children {
        push_subtree(domain, &node.id, child, out);
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn flattens_pre_order_with_parent_links() {
        let tree = vec![
            WireMenuDefinition::new("cms:content", "Content")
                .icon("file")
                .child(
                    WireMenuDefinition::new("cms:pages", "Pages")
                        .path("/cms/pages")
                        .permission("cms.page.read"),
                )
                .child(WireMenuDefinition::new("cms:media", "Media").path("/cms/media")),
            WireMenuDefinition::new("cms:settings", "Settings").path("/cms/settings"),
        ];

        let flat = flatten_menu("cms", &tree);

        let ids: Vec<_> = flat.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["cms:content", "cms:pages", "cms:media", "cms:settings"]);

        let parents: Vec<_> = flat.iter().map(|d| d.parent_id.as_str()).collect();
        assert_eq!(parents, vec!["", "cms:content", "cms:content", ""]);

        assert!(flat.iter().all(|d| d.domain == "cms"));
        assert_eq!(flat[0].path, None);
        assert_eq!(flat[0].icon.as_deref(), Some("file"));
        assert_eq!(flat[1].permissions, vec!["cms.page.read"]);
    }

    #[test]
    fn publisher_supplied_domain_and_parent_are_overwritten() {
        let mut node = WireMenuDefinition::new("x:node", "Node").path("/x");
        node.domain = "spoofed".to_string();
        node.parent_id = "elsewhere".to_string();

        let flat = flatten_menu("x", &[node]);

        assert_eq!(flat[0].domain, "x");
        assert_eq!(flat[0].parent_id, "");
    }

    #[test]
    fn deep_nesting_keeps_immediate_parent() {
        let tree = WireMenuDefinition::new("a", "A").child(
            WireMenuDefinition::new("b", "B").child(WireMenuDefinition::new("c", "C").path("/c")),
        );

        let flat = flatten_menu("d", &[tree]);

        assert_eq!(flat[2].id, "c");
        assert_eq!(flat[2].parent_id, "b");
    }
}
