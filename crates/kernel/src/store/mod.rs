//! Persistence seam for identity, RBAC, and the registration catalogs.
//!
//! [`AuthStore`] is implemented by [`postgres::PgAuthStore`] for production
//! and by [`memory::MemoryAuthStore`] for tests and database-less local runs.
//! Every read goes to the store; nothing is cached in-process.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Membership, MenuDefinition, NewPermission, Permission, Role, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryAuthStore;
pub use postgres::PgAuthStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A user together with the organization membership carried in their claims.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub membership: Option<Membership>,
}

/// Everything needed to create an account atomically.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Normalized email.
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub organization_name: String,
}

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Look up an account by normalized email.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Create user, organization, and an `ADMIN` membership as one unit.
    ///
    /// A duplicate email yields [`StoreError::Conflict`] and persists nothing.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;

    /// Upsert a module's permissions as one batch.
    async fn upsert_permissions(&self, permissions: &[NewPermission]) -> StoreResult<()>;
    async fn permission_exists(&self, id: &str) -> StoreResult<bool>;
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>>;

    /// A duplicate name yields [`StoreError::Conflict`].
    async fn create_role(&self, name: &str) -> StoreResult<Role>;
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// Idempotent. Unknown user or role yields [`StoreError::NotFound`].
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<()>;

    /// Idempotent. Unknown role yields [`StoreError::NotFound`].
    async fn add_permission_to_role(&self, role_id: Uuid, permission_id: &str)
    -> StoreResult<()>;

    /// Permissions granted through every role the user holds, without duplicates.
    async fn user_permissions(&self, user_id: Uuid) -> StoreResult<Vec<String>>;

    /// Upsert a domain's flattened menu as one batch: all rows or none.
    async fn upsert_menu_definitions(&self, defs: &[MenuDefinition]) -> StoreResult<()>;
    async fn list_menu_definitions(&self) -> StoreResult<Vec<MenuDefinition>>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
