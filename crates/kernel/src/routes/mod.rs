//! HTTP route handlers.

pub mod auth;
pub mod backoffice;
pub mod health;

use axum::Router;
use axum::middleware::from_fn_with_state;

use crate::middleware::require_bearer_token;
use crate::state::AppState;

/// Assemble every route; backoffice routes require a bearer token.
///
/// Cross-cutting layers (tracing, CORS, timeouts) are added by the binary.
pub fn app(state: AppState) -> Router {
    let backoffice = backoffice::router().route_layer(from_fn_with_state(
        state.clone(),
        require_bearer_token,
    ));

    Router::new()
        .merge(auth::router())
        .merge(health::router())
        .merge(backoffice)
        .with_state(state)
}
