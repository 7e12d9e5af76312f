//! Role based access control for behlog.
//!
//! Roles carry claims, users are assigned roles, and every protected operation
//! goes through the [`AuthorizationGate`]. The gate resolves the caller's roles
//! fresh from the store on each check, so claim and assignment changes made by
//! an administrator apply to the next request.

pub mod claim;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod permission;
pub mod policy_store;
pub mod resolver;
pub mod role;
pub mod store;

// Re-export the main types for easy access
pub use claim::{Claim, PERMISSION_CLAIM_TYPE};
pub use error::{AuthzError, AuthzResult};
pub use evaluator::PermissionEvaluator;
pub use gate::{AuthorizationGate, Decision, DenyReason, PermissionRequirement};
pub use permission::Permission;
pub use policy_store::{PolicyDocument, PolicyStore};
pub use resolver::RoleResolver;
pub use role::{Caller, Role, UserId};
pub use store::{AssignmentStore, ClaimChange, ClaimSync, RoleStore};
