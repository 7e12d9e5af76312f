pub mod assignments;
pub mod claims;
pub mod roles;

use behlog_core::authorization::{Claim, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClaimInfo {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl From<&Claim> for ClaimInfo {
    fn from(claim: &Claim) -> Self {
        ClaimInfo {
            claim_type: claim.claim_type().to_string(),
            value: claim.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::ToResponse)]
pub struct RoleInfo {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub claims: Vec<ClaimInfo>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleInfo {
    fn from(role: Role) -> Self {
        RoleInfo {
            id: role.id,
            claims: role.claims.iter().map(ClaimInfo::from).collect(),
            name: role.name,
            description: role.description,
            version: role.version,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}
