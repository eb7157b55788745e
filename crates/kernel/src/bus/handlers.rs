//! Decoding and persistence of registration messages.
//!
//! These functions hold everything the listener does with a payload, so
//! they can be driven directly without a running bus.

use beheer_sdk::topics::{MENUS_REGISTER, PERMISSIONS_REGISTER};
use beheer_sdk::types::{MenuDefinition, MenusRegistered, PermissionsRegistered};
use thiserror::Error;

use crate::services::AuthService;
use crate::store::StoreError;

/// Outcome of a successfully processed registration message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSummary {
    pub topic: &'static str,
    /// Module or domain the message registered for.
    pub owner: String,
    /// Permissions or menu nodes written.
    pub count: usize,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to decode {topic} payload: {source}")]
    Decode {
        topic: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {topic} payload: {reason}")]
    Invalid { topic: &'static str, reason: String },

    #[error("failed to store registration for {owner}: {source}")]
    Store {
        owner: String,
        #[source]
        source: StoreError,
    },
}

/// Route a raw message to its topic handler.
pub async fn dispatch(
    service: &AuthService,
    topic: &str,
    payload: &[u8],
) -> Result<RegistrationSummary, RegistrationError> {
    match topic {
        PERMISSIONS_REGISTER => handle_permissions_message(service, payload).await,
        MENUS_REGISTER => handle_menus_message(service, payload).await,
        other => Err(RegistrationError::Invalid {
            topic: "unknown",
            reason: format!("no handler for topic '{other}'"),
        }),
    }
}

/// Decode a `permissions.register` payload and upsert its permissions.
pub async fn handle_permissions_message(
    service: &AuthService,
    payload: &[u8],
) -> Result<RegistrationSummary, RegistrationError> {
    let topic = PERMISSIONS_REGISTER;
    let message: PermissionsRegistered = serde_json::from_slice(payload)
        .map_err(|source| RegistrationError::Decode { topic, source })?;

    if message.module.trim().is_empty() {
        return Err(invalid(topic, "module is empty"));
    }
    if message.permissions.iter().any(|p| p.id().trim().is_empty()) {
        return Err(invalid(topic, "permission id is empty"));
    }

    let count = service
        .register_module_permissions(&message.module, &message.permissions)
        .await
        .map_err(|source| RegistrationError::Store {
            owner: message.module.clone(),
            source,
        })?;

    Ok(RegistrationSummary {
        topic,
        owner: message.module,
        count,
    })
}

/// Decode a `menus.register` payload, flatten its tree, and upsert the nodes.
pub async fn handle_menus_message(
    service: &AuthService,
    payload: &[u8],
) -> Result<RegistrationSummary, RegistrationError> {
    let topic = MENUS_REGISTER;
    let message: MenusRegistered = serde_json::from_slice(payload)
        .map_err(|source| RegistrationError::Decode { topic, source })?;

    if message.domain.trim().is_empty() {
        return Err(invalid(topic, "domain is empty"));
    }
    if !message.menu.iter().all(has_ids) {
        return Err(invalid(topic, "menu node id is empty"));
    }

    let count = service
        .register_module_menus(&message.domain, &message.menu)
        .await
        .map_err(|source| RegistrationError::Store {
            owner: message.domain.clone(),
            source,
        })?;

    Ok(RegistrationSummary {
        topic,
        owner: message.domain,
        count,
    })
}

fn has_ids(node: &MenuDefinition) -> bool {
    !node.id.trim().is_empty() && node.children.iter().all(has_ids)
}

fn invalid(topic: &'static str, reason: &str) -> RegistrationError {
    RegistrationError::Invalid {
        topic,
        reason: reason.to_string(),
    }
}
