use axum::{extract::State, response::IntoResponse, Extension, Json};
use behlog_core::authorization::{Caller, PermissionEvaluator};
use serde::{Deserialize, Serialize};

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct MyPermissionsResponse {
    pub user_id: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/me/permissions",
    responses(
        (status = 200, response = inline(MyPermissionsResponse)),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 503, description = "Authorization store unavailable"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn my_permissions_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, AppError> {
    let user = caller.user_id().ok_or(AppError::Unauthenticated)?;

    let roles = state.gate.resolver().roles_for_user(user).await?;
    let permissions = PermissionEvaluator::new().effective_permissions(&roles);

    Ok(Json(MyPermissionsResponse {
        user_id: user.to_string(),
        roles: roles.into_iter().map(|r| r.name).collect(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }))
}
