//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::Client as RedisClient;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::services::{AuthService, TokenService};
use crate::store::PgAuthStore;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    auth: Arc<AuthService>,

    /// Registration bus client. `None` when running without a bus.
    redis: Option<RedisClient>,
}

impl AppState {
    /// Connect to PostgreSQL and Redis and build the services.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        info!("database migrations applied");

        let redis =
            RedisClient::open(config.redis_url.as_str()).context("failed to create Redis client")?;

        let auth = AuthService::new(
            Arc::new(PgAuthStore::new(pool)),
            TokenService::new(config.jwt_secret.as_bytes()),
            config.grant_policy,
        );

        Ok(Self::from_parts(Arc::new(auth), Some(redis)))
    }

    /// Assemble state from already-built services.
    pub fn from_parts(auth: Arc<AuthService>, redis: Option<RedisClient>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { auth, redis }),
        }
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.inner.auth
    }

    pub fn redis(&self) -> Option<&RedisClient> {
        self.inner.redis.as_ref()
    }

    /// Check if the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.auth.store().health_check().await.is_ok()
    }

    /// Check if Redis is healthy. `None` when no bus is configured.
    pub async fn redis_healthy(&self) -> Option<bool> {
        let client = self.inner.redis.as_ref()?;

        let Ok(mut conn) = client.get_multiplexed_async_connection().await else {
            return Some(false);
        };

        Some(
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .is_ok(),
        )
    }
}
