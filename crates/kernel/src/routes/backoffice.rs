//! Authenticated backoffice routes: navigation, permissions, roles.
//!
//! Every route here sits behind [`crate::middleware::require_bearer_token`],
//! so [`SessionClaims`] are always present in request extensions.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::error::AppResult;
use crate::menu::MenuNode;
use crate::models::{Permission, Role};
use crate::services::SessionClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPermissionRequest {
    pub permission_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

async fn my_menu(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Json<Vec<MenuNode>>> {
    let menu = state.auth().get_my_menu(claims.user_id).await?;
    Ok(Json(menu))
}

async fn my_permissions(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Json<Vec<String>>> {
    let mut permissions: Vec<String> = state
        .auth()
        .resolve_permissions(claims.user_id)
        .await?
        .into_iter()
        .collect();
    permissions.sort();

    Ok(Json(permissions))
}

async fn list_permissions(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Json<Vec<Permission>>> {
    state.auth().authorize(&claims, catalog::ROLE_READ).await?;
    Ok(Json(state.auth().list_permissions().await?))
}

async fn list_roles(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AppResult<Json<Vec<Role>>> {
    state.auth().authorize(&claims, catalog::ROLE_READ).await?;
    Ok(Json(state.auth().list_roles().await?))
}

async fn create_role(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    body: Result<Json<CreateRoleRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Role>)> {
    state.auth().authorize(&claims, catalog::ROLE_WRITE).await?;
    let Json(request) = body?;

    let role = state.auth().create_role(&request.name).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn add_permission_to_role(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(role_id): Path<Uuid>,
    body: Result<Json<AddPermissionRequest>, JsonRejection>,
) -> AppResult<Json<StatusResponse>> {
    state.auth().authorize(&claims, catalog::ROLE_WRITE).await?;
    let Json(request) = body?;

    state
        .auth()
        .add_permission_to_role(role_id, &request.permission_id)
        .await?;
    Ok(Json(StatusResponse { status: "added" }))
}

async fn assign_role(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<Uuid>,
    body: Result<Json<AssignRoleRequest>, JsonRejection>,
) -> AppResult<Json<StatusResponse>> {
    state.auth().authorize(&claims, catalog::USER_WRITE).await?;
    let Json(request) = body?;

    state.auth().assign_role(user_id, request.role_id).await?;
    Ok(Json(StatusResponse { status: "assigned" }))
}

/// Create the backoffice router. The caller applies the bearer layer.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/backoffice/me/menu", get(my_menu))
        .route("/backoffice/me/permissions", get(my_permissions))
        .route("/backoffice/permissions", get(list_permissions))
        .route("/backoffice/roles", get(list_roles).post(create_role))
        .route(
            "/backoffice/roles/{role_id}/permissions",
            post(add_permission_to_role),
        )
        .route("/backoffice/users/{user_id}/roles", post(assign_role))
}
