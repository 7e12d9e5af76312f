use thiserror::Error;
use uuid::Uuid;

use super::role::UserId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    #[error("Claim {claim_type}={value} not found on role {role_id}")]
    ClaimNotFound {
        role_id: Uuid,
        claim_type: String,
        value: String,
    },

    #[error("User '{user}' is not assigned to role {role_id}")]
    AssignmentNotFound { user: UserId, role_id: Uuid },

    #[error("Role already exists: {0}")]
    RoleAlreadyExists(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Role {role_id} changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        role_id: Uuid,
        expected: u64,
        actual: u64,
    },

    /// The backing persistence could not be read or written. Never means
    /// "denied".
    #[error("Role store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type AuthzResult<T> = Result<T, AuthzError>;
