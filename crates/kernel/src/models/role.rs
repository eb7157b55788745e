//! Role and grant models.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Role record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
}

impl Role {
    /// List all roles.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(pool)
            .await
            .context("failed to list roles")?;

        Ok(roles)
    }

    /// Create a new role.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self> {
        let id = Uuid::now_v7();

        let role =
            sqlx::query_as::<_, Role>("INSERT INTO roles (id, name) VALUES ($1, $2) RETURNING *")
                .bind(id)
                .bind(name)
                .fetch_one(pool)
                .await
                .context("failed to create role")?;

        Ok(role)
    }

    /// Grant a permission to a role. Granting twice is a no-op.
    pub async fn add_permission<'e>(
        executor: impl PgExecutor<'e>,
        role_id: Uuid,
        permission_id: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(executor)
        .await
        .context("failed to add permission to role")?;

        Ok(())
    }

    /// Assign a role to a user. Assigning twice is a no-op.
    pub async fn assign_to_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await
        .context("failed to assign role to user")?;

        Ok(())
    }

    /// Get all permissions for a user (aggregated from all their roles).
    pub async fn get_user_permissions(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>> {
        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT rp.permission_id
            FROM role_permissions rp
            JOIN user_roles ur ON rp.role_id = ur.role_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("failed to get user permissions")?;

        Ok(permissions)
    }
}
