//! Beheer test utilities.
//!
//! Fixtures for integration testing: sample module manifests, raw
//! registration payloads, and account credentials.

use beheer_sdk::prelude::*;
use serde_json::{Value as JsonValue, json};

/// Password used by every fixture account.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// A CMS module manifest: three permissions and a nested menu.
pub fn cms_manifest() -> ModuleManifest {
    ModuleManifest::new("cms")
        .permission("cms.page.read")
        .permission("cms.page.write")
        .permission("cms.page.delete")
        .menu(
            MenuDefinition::new("cms:root", "CMS")
                .icon("article")
                .order(20)
                .permission("cms.page.read")
                .child(
                    MenuDefinition::new("cms:pages", "Pages")
                        .path("/cms/pages")
                        .order(10)
                        .permission("cms.page.read"),
                )
                .child(
                    MenuDefinition::new("cms:media", "Media")
                        .path("/cms/media")
                        .order(20)
                        .permission("cms.page.read"),
                ),
        )
}

/// Encoded `permissions.register` payload with bare identifiers.
pub fn permissions_payload(module: &str, permissions: &[&str]) -> Vec<u8> {
    raw_payload(json!({
        "module": module,
        "permissions": permissions,
    }))
}

/// Encoded `menus.register` payload around an arbitrary JSON menu tree.
pub fn menus_payload(domain: &str, menu: JsonValue) -> Vec<u8> {
    raw_payload(json!({
        "domain": domain,
        "version": 1,
        "menu": menu,
    }))
}

/// Encode any JSON value as message bytes.
pub fn raw_payload(value: JsonValue) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Credentials for a fixture account.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub organization_name: String,
}

impl TestAccount {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            full_name: "Test User".to_string(),
            organization_name: "Test Organization".to_string(),
        }
    }

    /// Body for `POST /auth/register`.
    pub fn register_body(&self) -> JsonValue {
        json!({
            "email": self.email,
            "password": self.password,
            "full_name": self.full_name,
            "organization_name": self.organization_name,
        })
    }

    /// Body for `POST /auth/login`.
    pub fn login_body(&self) -> JsonValue {
        json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

/// `Authorization` header value for a session token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
