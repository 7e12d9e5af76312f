use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use behlog_core::authorization::{AssignmentStore, Caller, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::RoleInfo;
use crate::{api::error::AppError, app_state::SharedAppState};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct UserRolesResponse {
    pub user_id: String,
    pub roles: Vec<RoleInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct AssignRoleResponse {
    /// `false` when the user already held the role.
    pub assigned: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/users/{user_id}/roles",
    params(
        ("user_id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, response = inline(UserRolesResponse)),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - User.ManageRoles required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn user_roles_handler(
    State(state): State<SharedAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserId::new(user_id);
    let roles = state.gate.resolver().roles_for_user(&user).await?;

    Ok(Json(UserRolesResponse {
        user_id: user.to_string(),
        roles: roles.into_iter().map(RoleInfo::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/users/{user_id}/roles/{role_id}",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    responses(
        (status = 200, response = inline(AssignRoleResponse)),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - User.ManageRoles required"),
        (status = 404, description = "Role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn assign_role_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Path((user_id, role_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    info!("Admin {} assigning role {} to '{}'", caller, role_id, user_id);

    let assigned = state
        .store
        .assign_role(&UserId::new(user_id), role_id)
        .await?;
    Ok(Json(AssignRoleResponse { assigned }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/authenticated/admin/users/{user_id}/roles/{role_id}",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - User.ManageRoles required"),
        (status = 404, description = "User does not hold the role"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn unassign_role_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Path((user_id, role_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    info!("Admin {} removing role {} from '{}'", caller, role_id, user_id);

    state
        .store
        .unassign_role(&UserId::new(user_id), role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
