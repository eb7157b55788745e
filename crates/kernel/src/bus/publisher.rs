//! Publishing a module manifest onto the registration topics.

use anyhow::{Context, Result};
use beheer_sdk::prelude::*;
use redis::AsyncCommands;
use tracing::{info, warn};

use super::handlers::{RegistrationError, handle_menus_message, handle_permissions_message};
use crate::services::AuthService;

/// Subscriber counts reported by Redis for each published payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    pub permissions: u64,
    pub menus: u64,
}

impl PublishReceipt {
    /// Whether some subscriber received both payloads.
    ///
    /// Pub/sub retains nothing, so a payload published to zero subscribers is lost.
    pub fn delivered(&self) -> bool {
        self.permissions > 0 && self.menus > 0
    }
}

/// How a manifest reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Bus(PublishReceipt),
    InProcess,
}

/// Publish a manifest's permissions, then its menus.
pub async fn publish_manifest(
    client: &redis::Client,
    manifest: &ModuleManifest,
) -> Result<PublishReceipt> {
    let permissions = manifest
        .encode_permissions()
        .context("failed to encode permissions payload")?;
    let menus = manifest.encode_menus().context("failed to encode menus payload")?;

    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .context("failed to connect to redis")?;

    let permission_receivers: u64 = conn
        .publish(PERMISSIONS_REGISTER, permissions)
        .await
        .context("failed to publish permissions")?;
    let menu_receivers: u64 = conn
        .publish(MENUS_REGISTER, menus)
        .await
        .context("failed to publish menus")?;

    let receipt = PublishReceipt {
        permissions: permission_receivers,
        menus: menu_receivers,
    };
    info!(
        module = %manifest.module,
        permission_receivers,
        menu_receivers,
        "module manifest published"
    );
    Ok(receipt)
}

/// Publish a manifest, applying it in-process when the bus did not deliver it.
///
/// Registrations are upserts, so a manifest applied by both paths lands once.
pub async fn announce_manifest(
    client: &redis::Client,
    service: &AuthService,
    manifest: &ModuleManifest,
) -> Result<Delivery, RegistrationError> {
    match publish_manifest(client, manifest).await {
        Ok(receipt) if receipt.delivered() => return Ok(Delivery::Bus(receipt)),
        Ok(receipt) => warn!(
            module = %manifest.module,
            permission_receivers = receipt.permissions,
            menu_receivers = receipt.menus,
            "manifest had no subscriber, registering in-process"
        ),
        Err(e) => warn!(
            module = %manifest.module,
            error = %format!("{e:#}"),
            "failed to publish manifest, registering in-process"
        ),
    }

    register_locally(service, manifest).await?;
    Ok(Delivery::InProcess)
}

/// Apply a manifest in-process through the same handlers the listener uses.
pub async fn register_locally(
    service: &AuthService,
    manifest: &ModuleManifest,
) -> Result<(), RegistrationError> {
    let permissions = manifest
        .encode_permissions()
        .map_err(|source| RegistrationError::Decode {
            topic: PERMISSIONS_REGISTER,
            source,
        })?;
    let menus = manifest
        .encode_menus()
        .map_err(|source| RegistrationError::Decode {
            topic: MENUS_REGISTER,
            source,
        })?;

    handle_permissions_message(service, &permissions).await?;
    handle_menus_message(service, &menus).await?;

    info!(module = %manifest.module, "module manifest registered in-process");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog;
    use crate::config::GrantPolicy;
    use crate::services::TokenService;
    use crate::store::MemoryAuthStore;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes-long!!";

    fn service(store: Arc<MemoryAuthStore>) -> AuthService {
        AuthService::new(store, TokenService::new(SECRET), GrantPolicy::Permissive)
    }

    #[test]
    fn receipt_requires_a_receiver_on_both_topics() {
        let receipt = |permissions, menus| PublishReceipt { permissions, menus };

        assert!(receipt(1, 1).delivered());
        assert!(receipt(3, 2).delivered());
        assert!(!receipt(0, 0).delivered());
        assert!(!receipt(1, 0).delivered());
        assert!(!receipt(0, 1).delivered());
    }

    #[tokio::test]
    async fn unreachable_bus_falls_back_to_in_process_registration() {
        let store = Arc::new(MemoryAuthStore::new());
        let service = service(Arc::clone(&store));
        // Nothing listens on port 1, so the connection is refused
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();

        let delivery = announce_manifest(&client, &service, &catalog::manifest())
            .await
            .unwrap();

        assert_eq!(delivery, Delivery::InProcess);
        assert!(store.permission(catalog::ROLE_READ).await.is_some());
        assert!(store.menu_definition("auth:system").await.is_some());
        assert!(store.menu_definition("auth:roles").await.is_some());
    }
}
