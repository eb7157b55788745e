//! In-memory implementation of [`AuthStore`].
//!
//! All state sits behind one lock so multi-row writes are atomic with
//! respect to readers, mirroring the transactional Postgres store.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Account, AuthStore, NewAccount, StoreError, StoreResult};
use crate::models::organization::slugify;
use crate::models::{
    Membership, MembershipRole, MenuDefinition, NewPermission, Organization, Permission, Role,
    User,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    memberships: HashMap<Uuid, Membership>,
    permissions: BTreeMap<String, Permission>,
    roles: HashMap<Uuid, Role>,
    role_permissions: HashMap<Uuid, BTreeSet<String>>,
    user_roles: HashMap<Uuid, BTreeSet<Uuid>>,
    menus: BTreeMap<String, MenuDefinition>,
}

impl State {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }
}

#[derive(Default)]
pub struct MemoryAuthStore {
    state: RwLock<State>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing registration. Test setup helper.
    pub async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        membership: Option<Membership>,
    ) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            full_name: String::new(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        if let Some(membership) = membership {
            state.memberships.insert(user.id, membership);
        }
        state.users.insert(user.id, user.clone());
        user
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn organization_count(&self) -> usize {
        self.state.read().await.organizations.len()
    }

    pub async fn menu_definition(&self, id: &str) -> Option<MenuDefinition> {
        self.state.read().await.menus.get(id).cloned()
    }

    pub async fn permission(&self, id: &str) -> Option<Permission> {
        self.state.read().await.permissions.get(id).cloned()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.user_by_email(email).map(|user| Account {
            user: user.clone(),
            membership: state.memberships.get(&user.id).cloned(),
        }))
    }

    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut state = self.state.write().await;

        if state.user_by_email(&account.email).is_some() {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: account.email,
            password_hash: account.password_hash,
            full_name: account.full_name,
            created_at: now,
            updated_at: now,
        };
        let org = Organization {
            id: Uuid::now_v7(),
            slug: slugify(&account.organization_name),
            name: account.organization_name,
            created_at: now,
        };
        let membership = Membership {
            organization_id: org.id,
            role: MembershipRole::Admin,
        };

        state.memberships.insert(user.id, membership.clone());
        state.organizations.insert(org.id, org);
        state.users.insert(user.id, user.clone());

        Ok(Account {
            user,
            membership: Some(membership),
        })
    }

    async fn upsert_permissions(&self, permissions: &[NewPermission]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        for input in permissions {
            let created_at = state
                .permissions
                .get(&input.id)
                .map_or_else(Utc::now, |p| p.created_at);
            state.permissions.insert(
                input.id.clone(),
                Permission {
                    id: input.id.clone(),
                    module: input.module.clone(),
                    description: input.description.clone(),
                    created_at,
                },
            );
        }
        Ok(())
    }

    async fn permission_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.state.read().await.permissions.contains_key(id))
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut list: Vec<Permission> = state.permissions.values().cloned().collect();
        list.sort_by(|a, b| a.module.cmp(&b.module).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn create_role(&self, name: &str) -> StoreResult<Role> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|r| r.name == name) {
            return Err(StoreError::Conflict("role name already exists".to_string()));
        }

        let role = Role {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created: Utc::now(),
        };
        state.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::NotFound("user".to_string()));
        }
        if !state.roles.contains_key(&role_id) {
            return Err(StoreError::NotFound("role".to_string()));
        }
        state.user_roles.entry(user_id).or_default().insert(role_id);
        Ok(())
    }

    async fn add_permission_to_role(
        &self,
        role_id: Uuid,
        permission_id: &str,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(StoreError::NotFound("role".to_string()));
        }
        state
            .role_permissions
            .entry(role_id)
            .or_default()
            .insert(permission_id.to_string());
        Ok(())
    }

    async fn user_permissions(&self, user_id: Uuid) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        let granted: BTreeSet<&String> = state
            .user_roles
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|role_id| state.role_permissions.get(role_id))
            .flatten()
            .collect();
        Ok(granted.into_iter().cloned().collect())
    }

    async fn upsert_menu_definitions(&self, defs: &[MenuDefinition]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        for def in defs {
            state.menus.insert(def.id.clone(), def.clone());
        }
        Ok(())
    }

    async fn list_menu_definitions(&self) -> StoreResult<Vec<MenuDefinition>> {
        let state = self.state.read().await;
        Ok(state.menus.values().cloned().collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
