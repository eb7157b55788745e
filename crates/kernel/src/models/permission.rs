//! Permission catalog model.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// A registered permission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    /// `<module>.<resource>.<action>`
    pub id: String,
    pub module: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A permission as announced by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermission {
    pub id: String,
    pub module: String,
    pub description: String,
}

impl Permission {
    /// Insert or overwrite a permission, keyed by identifier.
    pub async fn upsert<'e>(executor: impl PgExecutor<'e>, input: &NewPermission) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, module, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                module = EXCLUDED.module,
                description = EXCLUDED.description
            "#,
        )
        .bind(&input.id)
        .bind(&input.module)
        .bind(&input.description)
        .execute(executor)
        .await
        .with_context(|| format!("failed to upsert permission {}", input.id))?;

        Ok(())
    }

    /// Check whether a permission has been registered.
    pub async fn exists(pool: &PgPool, id: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM permissions WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await
                .context("failed to check permission")?;

        Ok(exists)
    }

    /// List the whole catalog ordered by module, then identifier.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let permissions =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY module, id")
                .fetch_all(pool)
                .await
                .context("failed to list permissions")?;

        Ok(permissions)
    }
}
