//! Effective-permission resolution and capability checks.
//!
//! Every lookup goes to the store, so a grant or assignment is visible on
//! the very next request.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::MembershipRole;
use crate::services::token::SessionClaims;
use crate::store::{AuthStore, StoreResult};

/// Permission service backed by the role/permission store.
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn AuthStore>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// Union of the permissions granted by every role the user holds.
    ///
    /// A user with no roles resolves to the empty set.
    pub async fn resolve(&self, user_id: Uuid) -> StoreResult<HashSet<String>> {
        let permissions = self.store.user_permissions(user_id).await?;
        Ok(permissions.into_iter().collect())
    }

    /// Check if the token holder may perform `permission`.
    ///
    /// - Organization owners and admins pass every check.
    /// - Everyone else must hold the permission through a role.
    pub async fn user_has_permission(
        &self,
        claims: &SessionClaims,
        permission: &str,
    ) -> StoreResult<bool> {
        if is_administrative(claims) {
            return Ok(true);
        }

        let permissions = self.resolve(claims.user_id).await?;
        Ok(permissions.contains(permission))
    }

    /// Like [`Self::user_has_permission`], but `Forbidden` when denied.
    pub async fn authorize(&self, claims: &SessionClaims, permission: &str) -> AppResult<()> {
        if self.user_has_permission(claims, permission).await? {
            Ok(())
        } else {
            tracing::debug!(user_id = %claims.user_id, permission, "permission denied");
            Err(AppError::Forbidden)
        }
    }
}

fn is_administrative(claims: &SessionClaims) -> bool {
    claims
        .role
        .as_deref()
        .and_then(|role| role.parse::<MembershipRole>().ok())
        .is_some_and(|role| role.is_administrative())
}
