use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use behlog_core::authorization::{Caller, Claim, ClaimChange, RoleStore};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{ClaimInfo, RoleInfo};
use crate::{api::error::AppError, app_state::SharedAppState};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct AddClaimResponse {
    /// `added`, or `unchanged` when the role already held the claim.
    pub change: String,
    pub role: RoleInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SetClaimsRequest {
    pub values: Vec<String>,
    /// Fail with 409 if the role changed since this version was read.
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct SetClaimsResponse {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub version: u64,
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/roles/{role_id}/claims",
    params(
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    request_body = ClaimInfo,
    responses(
        (status = 200, response = inline(AddClaimResponse)),
        (status = 400, description = "Empty claim or unknown permission key"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.Manage required"),
        (status = 404, description = "Role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn add_claim_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Path(role_id): Path<Uuid>,
    Json(request): Json<ClaimInfo>,
) -> Result<impl IntoResponse, AppError> {
    let claim = Claim::new(&request.claim_type, &request.value)?;
    info!("Admin {} granting {} to role {}", caller, claim, role_id);

    let (change, role) = state.store.add_claim(role_id, claim).await?;

    Ok(Json(AddClaimResponse {
        change: match change {
            ClaimChange::Added => "added",
            ClaimChange::Unchanged => "unchanged",
        }
        .to_string(),
        role: role.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/authenticated/admin/roles/{role_id}/claims",
    params(
        ("role_id" = Uuid, Path, description = "Role id")
    ),
    request_body = ClaimInfo,
    responses(
        (status = 204, description = "Claim revoked"),
        (status = 400, description = "Empty claim or unknown permission key"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.Manage required"),
        (status = 404, description = "Role or claim not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn remove_claim_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Path(role_id): Path<Uuid>,
    Json(request): Json<ClaimInfo>,
) -> Result<impl IntoResponse, AppError> {
    let claim = Claim::new(&request.claim_type, &request.value)?;
    info!("Admin {} revoking {} from role {}", caller, claim, role_id);

    state.store.remove_claim(role_id, &claim).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/authenticated/admin/roles/{role_id}/claims/{claim_type}",
    params(
        ("role_id" = Uuid, Path, description = "Role id"),
        ("claim_type" = String, Path, description = "Claim type to replace, e.g. Permission")
    ),
    request_body = SetClaimsRequest,
    responses(
        (status = 200, response = inline(SetClaimsResponse)),
        (status = 400, description = "Empty claim or unknown permission key"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - Role.Manage required"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role was modified since expected_version"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn set_claims_handler(
    State(state): State<SharedAppState>,
    Extension(caller): Extension<Caller>,
    Path((role_id, claim_type)): Path<(Uuid, String)>,
    Json(request): Json<SetClaimsRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(
        "Admin {} setting {} '{}' claims on role {}",
        caller,
        request.values.len(),
        claim_type,
        role_id
    );

    let sync = state
        .store
        .set_claims_of_type(role_id, &claim_type, &request.values, request.expected_version)
        .await?;

    Ok(Json(SetClaimsResponse {
        added: sync.added,
        removed: sync.removed,
        version: sync.version,
    }))
}
