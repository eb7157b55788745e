//! Authentication, role administration, and per-user navigation.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use beheer_sdk::types::{MenuDefinition as WireMenuDefinition, PermissionEntry};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GrantPolicy;
use crate::error::{AppError, AppResult};
use crate::menu::{MenuNode, compose_menu, flatten_menu};
use crate::models::user::{dummy_password_hash, hash_password, normalize_email, verify_password_hash};
use crate::models::{NewPermission, Permission, Role};
use crate::permissions::PermissionService;
use crate::services::token::{SessionClaims, TokenService};
use crate::store::{AuthStore, NewAccount, StoreResult};

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub organization_name: String,
}

/// The authorization module's service facade.
pub struct AuthService {
    store: Arc<dyn AuthStore>,
    tokens: TokenService,
    permissions: PermissionService,
    grant_policy: GrantPolicy,
}

impl AuthService {
    pub fn new(store: Arc<dyn AuthStore>, tokens: TokenService, grant_policy: GrantPolicy) -> Self {
        Self {
            permissions: PermissionService::new(Arc::clone(&store)),
            store,
            tokens,
            grant_policy,
        }
    }

    pub fn store(&self) -> &dyn AuthStore {
        self.store.as_ref()
    }

    /// Authenticate by email and password and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let email = normalize_email(email);
        let account = self.store.find_account_by_email(&email).await?;

        let hash = account
            .as_ref()
            .map_or_else(|| dummy_password_hash().to_string(), |a| a.user.password_hash.clone());
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password_hash(&hash, &password))
            .await
            .context("password verification task failed")?;

        let Some(account) = account.filter(|_| verified) else {
            debug!("login rejected");
            return Err(AppError::Unauthorized);
        };

        let token = self.tokens.issue(&account)?;
        info!(user_id = %account.user.id, "user logged in");
        Ok(token)
    }

    /// Create a user together with their organization, linked as `ADMIN`.
    pub async fn register(&self, input: Registration) -> AppResult<()> {
        let email = normalize_email(&input.email);
        let full_name = input.full_name.trim().to_string();
        let organization_name = input.organization_name.trim().to_string();

        if !email.contains('@') {
            return Err(AppError::BadRequest("email is invalid".to_string()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if full_name.is_empty() {
            return Err(AppError::BadRequest("full_name is required".to_string()));
        }
        if organization_name.is_empty() {
            return Err(AppError::BadRequest("organization_name is required".to_string()));
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .context("password hashing task failed")??;

        let account = self
            .store
            .create_account(NewAccount {
                email,
                password_hash,
                full_name,
                organization_name,
            })
            .await?;

        info!(
            user_id = %account.user.id,
            organization_id = ?account.membership.as_ref().map(|m| m.organization_id),
            "user registered"
        );
        Ok(())
    }

    /// Create a role. Names are trimmed and must be unique.
    pub async fn create_role(&self, name: &str) -> AppResult<Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("role name is required".to_string()));
        }

        let role = self.store.create_role(name).await?;
        info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }

    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.store.list_roles().await?)
    }

    /// Assign a role to a user. Assigning twice is a no-op.
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        self.store.assign_role(user_id, role_id).await?;
        info!(%user_id, %role_id, "role assigned");
        Ok(())
    }

    /// Grant a permission to a role. Granting twice is a no-op.
    ///
    /// Under [`GrantPolicy::Strict`] the permission must have been registered.
    pub async fn add_permission_to_role(&self, role_id: Uuid, permission_id: &str) -> AppResult<()> {
        let permission_id = permission_id.trim();
        if permission_id.is_empty() {
            return Err(AppError::BadRequest("permission_id is required".to_string()));
        }

        if self.grant_policy == GrantPolicy::Strict
            && !self.store.permission_exists(permission_id).await?
        {
            return Err(AppError::NotFound(format!("permission {permission_id}")));
        }

        self.store.add_permission_to_role(role_id, permission_id).await?;
        info!(%role_id, permission = permission_id, "permission granted");
        Ok(())
    }

    /// Effective permissions of a user: the union over all their roles.
    pub async fn resolve_permissions(&self, user_id: Uuid) -> AppResult<HashSet<String>> {
        Ok(self.permissions.resolve(user_id).await?)
    }

    /// The registered permission catalog.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.store.list_permissions().await?)
    }

    /// Navigation tree visible to the user.
    pub async fn get_my_menu(&self, user_id: Uuid) -> AppResult<Vec<MenuNode>> {
        let defs = self.store.list_menu_definitions().await?;
        let permissions = self.permissions.resolve(user_id).await?;
        Ok(compose_menu(&defs, &permissions))
    }

    /// `Forbidden` unless the token holder may perform `permission`.
    pub async fn authorize(&self, claims: &SessionClaims, permission: &str) -> AppResult<()> {
        self.permissions.authorize(claims, permission).await
    }

    pub fn verify_token(&self, token: &str) -> AppResult<SessionClaims> {
        self.tokens.verify(token)
    }

    /// Persist a module's permission catalog. Returns the number of entries.
    pub async fn register_module_permissions(
        &self,
        module: &str,
        entries: &[PermissionEntry],
    ) -> StoreResult<usize> {
        let permissions: Vec<NewPermission> = entries
            .iter()
            .map(|entry| NewPermission {
                id: entry.id().to_string(),
                module: module.to_string(),
                description: entry.description().to_string(),
            })
            .collect();

        self.store.upsert_permissions(&permissions).await?;
        info!(module, count = permissions.len(), "permissions registered");
        Ok(permissions.len())
    }

    /// Flatten and persist a domain's menu tree. Returns the number of nodes.
    pub async fn register_module_menus(
        &self,
        domain: &str,
        roots: &[WireMenuDefinition],
    ) -> StoreResult<usize> {
        let defs = flatten_menu(domain, roots);
        if defs.is_empty() {
            warn!(domain, "menu registration without nodes");
        }

        self.store.upsert_menu_definitions(&defs).await?;
        info!(domain, count = defs.len(), "menus registered");
        Ok(defs.len())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &self.store.backend_name())
            .field("grant_policy", &self.grant_policy)
            .finish()
    }
}
