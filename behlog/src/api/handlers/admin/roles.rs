use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use behlog_core::authorization::{Caller, RoleStore};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::RoleInfo;
use crate::{api::error::AppError, app_state::SharedAppState};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RoleWithUserCount {
    #[serde(flatten)]
    pub role: RoleInfo,
    pub user_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct RolesListResponse {
    pub roles: Vec<RoleWithUserCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct RoleUsersResponse {
    pub role_id: Uuid,
    pub users: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/roles",
    responses(
        (status = 200, response = inline(RolesListResponse)),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.View required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_roles_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    let roles = state
        .gate
        .resolver()
        .roles_with_user_counts()
        .await?
        .into_iter()
        .map(|(role, user_count)| RoleWithUserCount {
            role: role.into(),
            user_count,
        })
        .collect();

    Ok(Json(RolesListResponse { roles }))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, response = inline(RoleInfo)),
        (status = 400, description = "Role name is empty"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.Manage required"),
        (status = 409, description = "Role already exists"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_role_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Admin {} creating role '{}'", caller, request.name);

    let role = state
        .store
        .create_role(&request.name, &request.description)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleInfo::from(role))))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/roles/{role_id}",
    params(
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    responses(
        (status = 200, response = inline(RoleInfo)),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.View required"),
        (status = 404, description = "Role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_role_handler(
    State(state): State<SharedAppState>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let role = state.store.get_role(role_id).await?;
    Ok(Json(RoleInfo::from(role)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/authenticated/admin/roles/{role_id}",
    params(
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    responses(
        (status = 204, description = "Role and its assignments deleted"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.Manage required"),
        (status = 404, description = "Role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn delete_role_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    info!("Admin {} deleting role {}", caller, role_id);
    state.store.delete_role(role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/roles/{role_id}/users",
    params(
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    responses(
        (status = 200, response = inline(RoleUsersResponse)),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.View required"),
        (status = 404, description = "Role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn role_users_handler(
    State(state): State<SharedAppState>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let users = state.gate.resolver().users_in_role(role_id).await?;
    Ok(Json(RoleUsersResponse {
        role_id,
        users: users.iter().map(|u| u.to_string()).collect(),
    }))
}
