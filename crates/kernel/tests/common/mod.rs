#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] wires the real router, services, and middleware on top of a
//! fresh [`MemoryAuthStore`], so each test owns isolated state and needs no
//! running database or bus.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use beheer_kernel::config::GrantPolicy;
use beheer_kernel::models::user::hash_password;
use beheer_kernel::models::{Membership, MembershipRole};
use beheer_kernel::services::{AuthService, TokenService};
use beheer_kernel::state::AppState;
use beheer_kernel::store::MemoryAuthStore;
use beheer_test_utils::{TEST_PASSWORD, TestAccount, bearer};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-at-least-32-bytes";

/// Test application wrapper using the real kernel routes and services.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryAuthStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(GrantPolicy::Permissive)
    }

    pub fn with_policy(policy: GrantPolicy) -> Self {
        let store = Arc::new(MemoryAuthStore::new());
        let auth = AuthService::new(store.clone(), TokenService::new(TEST_SECRET), policy);
        let state = AppState::from_parts(Arc::new(auth), None);
        let router = beheer_kernel::routes::app(state.clone());

        Self {
            router,
            store,
            state,
        }
    }

    pub fn auth(&self) -> &AuthService {
        self.state.auth()
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register through the API and log in. The account is its organization's ADMIN.
    pub async fn admin_token(&self, email: &str) -> String {
        let account = TestAccount::new(email);
        let response = self
            .post_json("/auth/register", &account.register_body(), None)
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);

        self.login(&account).await
    }

    /// Create a plain organization member and log in.
    pub async fn member(&self, email: &str) -> (Uuid, String) {
        let hash = hash_password(TEST_PASSWORD).unwrap();
        let membership = Membership {
            organization_id: Uuid::now_v7(),
            role: MembershipRole::User,
        };
        let user = self.store.insert_user(email, &hash, Some(membership)).await;

        let token = self.login(&TestAccount::new(email)).await;
        (user.id, token)
    }

    pub async fn login(&self, account: &TestAccount) -> String {
        let response = self
            .post_json("/auth/login", &account.login_body(), None)
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        response_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

/// Collect a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
