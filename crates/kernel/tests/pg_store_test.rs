#![allow(clippy::unwrap_used, clippy::expect_used)]
//! `PgAuthStore` against a live PostgreSQL.
//!
//! Set `BEHEER_TEST_DATABASE_URL` or `DATABASE_URL` to run these; without
//! one, or when the database is unreachable, each test logs and returns.
//! Every test uses fresh identifiers, so no truncation is needed.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use beheer_kernel::db;
use beheer_kernel::models::{MembershipRole, MenuDefinition, NewPermission};
use beheer_kernel::store::{AuthStore, NewAccount, PgAuthStore, StoreError};

async fn pg_store() -> Option<(PgAuthStore, PgPool)> {
    let url = match std::env::var("BEHEER_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping postgres store tests: set BEHEER_TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(2))
        .connect(&url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping postgres store tests: cannot connect: {err}");
            return None;
        }
    };

    db::run_migrations(&pool).await.unwrap();
    Some((PgAuthStore::new(pool.clone()), pool))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7().simple())
}

fn new_account(email: &str, organization_name: &str) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        full_name: "Ada Lovelace".to_string(),
        organization_name: organization_name.to_string(),
    }
}

async fn organizations_named(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM organizations WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn create_account_links_user_to_new_organization_as_admin() {
    let Some((store, pool)) = pg_store().await else {
        return;
    };
    let email = format!("{}@example.com", unique("ada"));
    let org_name = unique("Engines");

    let account = store.create_account(new_account(&email, &org_name)).await.unwrap();
    let membership = account.membership.unwrap();
    assert_eq!(membership.role, MembershipRole::Admin);
    assert_eq!(organizations_named(&pool, &org_name).await, 1);

    let found = store.find_account_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.user.id, account.user.id);
    assert_eq!(found.membership.unwrap().organization_id, membership.organization_id);
}

#[tokio::test]
async fn duplicate_email_conflicts_and_leaves_no_organization() {
    let Some((store, pool)) = pg_store().await else {
        return;
    };
    let email = format!("{}@example.com", unique("dup"));

    store
        .create_account(new_account(&email, &unique("First")))
        .await
        .unwrap();

    let second_org = unique("Second");
    let err = store
        .create_account(new_account(&email, &second_org))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(organizations_named(&pool, &second_org).await, 0);
}

#[tokio::test]
async fn duplicate_role_name_conflicts() {
    let Some((store, _pool)) = pg_store().await else {
        return;
    };
    let name = unique("editor");

    store.create_role(&name).await.unwrap();
    let err = store.create_role(&name).await.unwrap_err();

    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn unknown_role_or_user_is_not_found() {
    let Some((store, _pool)) = pg_store().await else {
        return;
    };
    let email = format!("{}@example.com", unique("member"));
    let account = store
        .create_account(new_account(&email, &unique("Org")))
        .await
        .unwrap();
    let role = store.create_role(&unique("viewer")).await.unwrap();

    let err = store.assign_role(account.user.id, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store.assign_role(Uuid::now_v7(), role.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store
        .add_permission_to_role(Uuid::now_v7(), "cms.page.read")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn grants_are_idempotent_and_resolve_as_a_union() {
    let Some((store, _pool)) = pg_store().await else {
        return;
    };
    let email = format!("{}@example.com", unique("grants"));
    let account = store
        .create_account(new_account(&email, &unique("Org")))
        .await
        .unwrap();
    let reader = store.create_role(&unique("reader")).await.unwrap();
    let writer = store.create_role(&unique("writer")).await.unwrap();

    store.add_permission_to_role(reader.id, "cms.page.read").await.unwrap();
    store.add_permission_to_role(reader.id, "cms.page.read").await.unwrap();
    store.add_permission_to_role(writer.id, "cms.page.read").await.unwrap();
    store.add_permission_to_role(writer.id, "cms.page.write").await.unwrap();

    store.assign_role(account.user.id, reader.id).await.unwrap();
    store.assign_role(account.user.id, reader.id).await.unwrap();
    store.assign_role(account.user.id, writer.id).await.unwrap();

    let mut permissions = store.user_permissions(account.user.id).await.unwrap();
    permissions.sort();
    assert_eq!(permissions, vec!["cms.page.read", "cms.page.write"]);
}

#[tokio::test]
async fn permission_upsert_twice_keeps_one_row() {
    let Some((store, pool)) = pg_store().await else {
        return;
    };
    let id = format!("{}.page.read", unique("cms").replace('-', "_"));

    let first = NewPermission {
        id: id.clone(),
        module: "cms".to_string(),
        description: String::new(),
    };
    let second = NewPermission {
        description: "Read pages".to_string(),
        ..first.clone()
    };
    store.upsert_permissions(&[first]).await.unwrap();
    store.upsert_permissions(&[second]).await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permissions WHERE id = $1")
        .bind(&id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert!(store.permission_exists(&id).await.unwrap());

    let stored = store
        .list_permissions()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == id)
        .unwrap();
    assert_eq!(stored.description, "Read pages");
}

#[tokio::test]
async fn menu_rows_round_trip_with_empty_root_parent() {
    let Some((store, pool)) = pg_store().await else {
        return;
    };
    let domain = unique("menus");
    let root = MenuDefinition {
        id: format!("{domain}:root"),
        domain: domain.clone(),
        label: "Root".to_string(),
        path: None,
        icon: Some("settings".to_string()),
        order: 90,
        parent_id: String::new(),
        permissions: vec!["auth.role.read".to_string()],
        visible: true,
    };
    let child = MenuDefinition {
        id: format!("{domain}:child"),
        label: "Child".to_string(),
        path: Some("/child".to_string()),
        icon: None,
        order: 10,
        parent_id: root.id.clone(),
        permissions: Vec::new(),
        ..root.clone()
    };
    let defs = vec![root.clone(), child.clone()];

    store.upsert_menu_definitions(&defs).await.unwrap();
    store.upsert_menu_definitions(&defs).await.unwrap();

    let stored: Vec<MenuDefinition> = store
        .list_menu_definitions()
        .await
        .unwrap()
        .into_iter()
        .filter(|d| d.domain == domain)
        .collect();
    assert_eq!(stored, vec![child, root.clone()]);

    let null_parents: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM menu_definitions WHERE id = $1 AND parent_id IS NULL",
    )
    .bind(&root.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(null_parents, 1);
}

#[tokio::test]
async fn health_check_reports_postgres() {
    let Some((store, _pool)) = pg_store().await else {
        return;
    };

    store.health_check().await.unwrap();
    assert_eq!(store.backend_name(), "postgres");
}
