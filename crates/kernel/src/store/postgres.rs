//! PostgreSQL implementation of [`AuthStore`].
//!
//! Multi-row writes (account creation, registration batches) run inside a
//! single transaction; dropping an uncommitted `sqlx::Transaction` rolls it
//! back, so any early `?` return leaves no partial rows.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Account, AuthStore, NewAccount, StoreError, StoreResult};
use crate::models::{
    Membership, MembershipRole, MenuDefinition, NewPermission, NewUser, Organization, Permission,
    Role, User,
};

/// Postgres-backed store sharing the application pool.
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into domain errors.
///
/// Unique violations become [`StoreError::Conflict`] and foreign-key
/// violations [`StoreError::NotFound`]; everything else stays unexpected.
fn classify(err: anyhow::Error, conflict: &str, missing: &str) -> StoreError {
    let db_err = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error());

    match db_err {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(conflict.to_string()),
        Some(db) if db.is_foreign_key_violation() => StoreError::NotFound(missing.to_string()),
        _ => StoreError::Unexpected(err),
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let Some(user) = User::find_by_email(&self.pool, email).await? else {
            return Ok(None);
        };

        let membership = Organization::membership_for_user(&self.pool, user.id).await?;

        Ok(Some(Account { user, membership }))
    }

    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e).context("failed to begin transaction")))?;

        let new_user = NewUser {
            email: account.email,
            password_hash: account.password_hash,
            full_name: account.full_name,
        };

        let user = User::insert(&mut *tx, Uuid::now_v7(), &new_user)
            .await
            .map_err(|e| classify(e, "email already registered", "user"))?;

        let org = Organization::insert(&mut *tx, Uuid::now_v7(), &account.organization_name).await?;

        Organization::link_user(&mut *tx, org.id, user.id, MembershipRole::Admin).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e).context("failed to commit account")))?;

        debug!(user_id = %user.id, organization_id = %org.id, "account created");

        Ok(Account {
            user,
            membership: Some(Membership {
                organization_id: org.id,
                role: MembershipRole::Admin,
            }),
        })
    }

    async fn upsert_permissions(&self, permissions: &[NewPermission]) -> StoreResult<()> {
        if permissions.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e).context("failed to begin transaction")))?;

        for permission in permissions {
            Permission::upsert(&mut *tx, permission).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e).context("failed to commit permissions")))?;

        Ok(())
    }

    async fn permission_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(Permission::exists(&self.pool, id).await?)
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        Ok(Permission::list(&self.pool).await?)
    }

    async fn create_role(&self, name: &str) -> StoreResult<Role> {
        Role::create(&self.pool, name)
            .await
            .map_err(|e| classify(e, "role name already exists", "role"))
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(Role::list(&self.pool).await?)
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<()> {
        Role::assign_to_user(&self.pool, user_id, role_id)
            .await
            .map_err(|e| classify(e, "role already assigned", "user or role"))
    }

    async fn add_permission_to_role(
        &self,
        role_id: Uuid,
        permission_id: &str,
    ) -> StoreResult<()> {
        Role::add_permission(&self.pool, role_id, permission_id)
            .await
            .map_err(|e| classify(e, "permission already granted", "role"))
    }

    async fn user_permissions(&self, user_id: Uuid) -> StoreResult<Vec<String>> {
        Ok(Role::get_user_permissions(&self.pool, user_id).await?)
    }

    async fn upsert_menu_definitions(&self, defs: &[MenuDefinition]) -> StoreResult<()> {
        if defs.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e).context("failed to begin transaction")))?;

        for def in defs {
            MenuDefinition::upsert(&mut *tx, def).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Unexpected(anyhow::Error::new(e).context("failed to commit menu definitions")))?;

        Ok(())
    }

    async fn list_menu_definitions(&self) -> StoreResult<Vec<MenuDefinition>> {
        Ok(MenuDefinition::list(&self.pool).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        if crate::db::check_health(&self.pool).await {
            Ok(())
        } else {
            Err(StoreError::Unexpected(anyhow::anyhow!("postgres is unreachable")))
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
