//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Minimum length of the token signing secret in bytes.
const MIN_JWT_SECRET_LEN: usize = 32;

/// How `add_permission_to_role` treats permissions no module has registered.
///
/// Registration is asynchronous and may lag administrative setup, so the
/// default accepts grants for permissions the catalog has not seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantPolicy {
    /// Accept any permission identifier.
    #[default]
    Permissive,
    /// Reject identifiers missing from the permission catalog.
    Strict,
}

impl FromStr for GrantPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(GrantPolicy::Permissive),
            "strict" => Ok(GrantPolicy::Strict),
            other => anyhow::bail!("unknown grant policy '{other}' (expected permissive or strict)"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Redis connection URL, used as the registration bus.
    pub redis_url: String,

    /// Shared secret for signing session tokens.
    pub jwt_secret: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Whether role grants require a registered permission (default: permissive).
    pub grant_policy: GrantPolicy,

    /// Per-request deadline in seconds (default: 30).
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let jwt_secret =
            env::var("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        validate_jwt_secret(&jwt_secret)?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let grant_policy = env::var("PERMISSION_GRANT_POLICY")
            .map(|v| v.parse())
            .unwrap_or(Ok(GrantPolicy::Permissive))
            .context("PERMISSION_GRANT_POLICY must be 'permissive' or 'strict'")?;

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            redis_url,
            jwt_secret,
            cors_allowed_origins,
            grant_policy,
            request_timeout_secs,
        })
    }
}

fn validate_jwt_secret(secret: &str) -> Result<()> {
    if secret.len() < MIN_JWT_SECRET_LEN {
        anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes");
    }
    Ok(())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
