//! Storage contracts for roles, their claims and user assignments.
//!
//! Every mutation is atomic: it is either fully applied and durable when it
//! returns `Ok`, or it is not applied at all. Reads see the last published
//! state and never block on each other.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::claim::Claim;
use super::error::AuthzResult;
use super::role::{Role, UserId};

/// Outcome of adding a claim. A duplicate grant is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimChange {
    Added,
    Unchanged,
}

/// Result of replacing all claims of one type on a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimSync {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Role version after the sync.
    pub version: u64,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_role(&self, id: Uuid) -> AuthzResult<Role>;

    /// Case-insensitive lookup by role name.
    async fn find_role_by_name(&self, name: &str) -> AuthzResult<Option<Role>>;

    /// All roles ordered by name.
    async fn list_roles(&self) -> AuthzResult<Vec<Role>>;

    async fn create_role(&self, name: &str, description: &str) -> AuthzResult<Role>;

    /// Delete a role together with every assignment pointing at it.
    async fn delete_role(&self, id: Uuid) -> AuthzResult<()>;

    /// Grant `claim` to the role. Returns the role as it stands right after
    /// this mutation, so callers never need a second read that could race
    /// with a concurrent delete.
    async fn add_claim(&self, role_id: Uuid, claim: Claim) -> AuthzResult<(ClaimChange, Role)>;

    async fn remove_claim(&self, role_id: Uuid, claim: &Claim) -> AuthzResult<()>;

    /// Make the role's claims of `claim_type` exactly `values`, leaving other
    /// claim types alone. When `expected_version` is given the call fails with
    /// `VersionConflict` if the role changed in the meantime.
    async fn set_claims_of_type(
        &self,
        role_id: Uuid,
        claim_type: &str,
        values: &[String],
        expected_version: Option<u64>,
    ) -> AuthzResult<ClaimSync>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Returns `false` when the user already had the role.
    async fn assign_role(&self, user: &UserId, role_id: Uuid) -> AuthzResult<bool>;

    async fn unassign_role(&self, user: &UserId, role_id: Uuid) -> AuthzResult<()>;

    async fn role_ids_for_user(&self, user: &UserId) -> AuthzResult<BTreeSet<Uuid>>;

    /// Users holding the role, sorted.
    async fn users_in_role(&self, role_id: Uuid) -> AuthzResult<Vec<UserId>>;
}
