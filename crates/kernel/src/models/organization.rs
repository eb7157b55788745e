//! Organization (tenant) model and membership.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// A user's role inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRole {
    Owner,
    Admin,
    User,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "OWNER",
            MembershipRole::Admin => "ADMIN",
            MembershipRole::User => "USER",
        }
    }

    /// Owners and admins pass every capability check in their organization.
    pub fn is_administrative(&self) -> bool {
        matches!(self, MembershipRole::Owner | MembershipRole::Admin)
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OWNER" => Ok(MembershipRole::Owner),
            "ADMIN" => Ok(MembershipRole::Admin),
            "USER" => Ok(MembershipRole::User),
            other => anyhow::bail!("unknown membership role '{other}'"),
        }
    }
}

/// Organization record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A user's membership in an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub organization_id: Uuid,
    pub role: MembershipRole,
}

impl Organization {
    /// Insert a new organization.
    pub async fn insert<'e>(executor: impl PgExecutor<'e>, id: Uuid, name: &str) -> Result<Self> {
        let org = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, slug) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slugify(name))
        .fetch_one(executor)
        .await
        .context("failed to create organization")?;

        Ok(org)
    }

    /// Link a user to an organization with the given role.
    pub async fn link_user<'e>(
        executor: impl PgExecutor<'e>,
        organization_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO organization_users (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(executor)
        .await
        .context("failed to link user to organization")?;

        Ok(())
    }

    /// The user's earliest membership, which is the organization they registered with.
    pub async fn membership_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> Result<Option<Membership>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT organization_id, role FROM organization_users
            WHERE user_id = $1
            ORDER BY created_at, organization_id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch organization membership")?;

        let Some((organization_id, role)) = row else {
            return Ok(None);
        };

        Ok(Some(Membership {
            organization_id,
            role: role.parse()?,
        }))
    }
}

/// Derive a URL-safe slug from an organization name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
