//! Stored navigation node definitions.
//!
//! Storage is flat: every node references its parent by ID and the tree is
//! rebuilt on read by [`crate::menu::compose_menu`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// A flat menu definition row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuDefinition {
    /// Stable, globally unique ID (`<domain>:<node>`).
    pub id: String,
    /// Domain (module) that registered the node.
    pub domain: String,
    pub label: String,
    /// Route path; `None` for pure grouping nodes.
    pub path: Option<String>,
    pub icon: Option<String>,
    #[sqlx(rename = "order_index")]
    pub order: i32,
    /// Parent node ID; empty for root nodes.
    pub parent_id: String,
    /// Any one of these grants visibility. Empty = visible to everyone.
    pub permissions: Vec<String>,
    pub visible: bool,
}

impl MenuDefinition {
    /// Whether the node is a pure grouping node without its own route.
    pub fn is_container(&self) -> bool {
        self.path.is_none()
    }

    /// Insert or fully replace a definition, keyed by ID.
    pub async fn upsert<'e>(executor: impl PgExecutor<'e>, def: &MenuDefinition) -> Result<()> {
        let parent_id = (!def.parent_id.is_empty()).then_some(def.parent_id.as_str());

        sqlx::query(
            r#"
            INSERT INTO menu_definitions
                (id, domain, label, path, icon, order_index, parent_id, permissions, visible, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (id) DO UPDATE SET
                domain = EXCLUDED.domain,
                label = EXCLUDED.label,
                path = EXCLUDED.path,
                icon = EXCLUDED.icon,
                order_index = EXCLUDED.order_index,
                parent_id = EXCLUDED.parent_id,
                permissions = EXCLUDED.permissions,
                visible = EXCLUDED.visible,
                updated_at = NOW()
            "#,
        )
        .bind(&def.id)
        .bind(&def.domain)
        .bind(&def.label)
        .bind(&def.path)
        .bind(&def.icon)
        .bind(def.order)
        .bind(parent_id)
        .bind(&def.permissions)
        .bind(def.visible)
        .execute(executor)
        .await
        .with_context(|| format!("failed to upsert menu definition {}", def.id))?;

        Ok(())
    }

    /// Load every definition.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let defs = sqlx::query_as::<_, MenuDefinition>(
            r#"
            SELECT id, domain, label, path, icon, order_index,
                   COALESCE(parent_id, '') AS parent_id, permissions, visible
            FROM menu_definitions
            ORDER BY domain, order_index, id
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list menu definitions")?;

        Ok(defs)
    }
}
