use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

use super::error::AuthzResult;
use super::evaluator::PermissionEvaluator;
use super::permission::Permission;
use super::resolver::RoleResolver;
use super::role::{Caller, UserId};

/// The permission a protected operation demands before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRequirement {
    permission: Permission,
}

impl PermissionRequirement {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }
}

impl From<Permission> for PermissionRequirement {
    fn from(permission: Permission) -> Self {
        Self::new(permission)
    }
}

impl fmt::Display for PermissionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.permission.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No caller identity; decided without looking at any role.
    Unauthenticated,
    /// The caller holds no roles at all.
    NoRoles,
    /// The caller's roles do not grant the required permission.
    MissingPermission,
}

/// Terminal state of an authorization check. A check is pending until
/// [`AuthorizationGate::authorize`] returns one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Granted,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted)
    }
}

/// Enforcement point for protected operations.
///
/// A denial is returned as `Ok(Decision::Denied(_))`. `Err` is reserved for
/// the case where the store could not be read, so callers can tell "you may
/// not do this" apart from "the system could not decide".
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    resolver: RoleResolver,
    evaluator: PermissionEvaluator,
}

impl AuthorizationGate {
    pub fn new(resolver: RoleResolver, evaluator: PermissionEvaluator) -> Self {
        Self {
            resolver,
            evaluator,
        }
    }

    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    pub async fn authorize(
        &self,
        caller: &Caller,
        requirement: impl Into<PermissionRequirement>,
    ) -> AuthzResult<Decision> {
        let requirement = requirement.into();

        let user = match caller {
            Caller::Anonymous => {
                warn!("Denied {}: caller is not authenticated", requirement);
                return Ok(Decision::Denied(DenyReason::Unauthenticated));
            }
            Caller::User(user) => user,
        };

        let roles = self.resolver.roles_for_user(user).await?;
        if roles.is_empty() {
            warn!("Denied {} to '{}': no roles assigned", requirement, user);
            return Ok(Decision::Denied(DenyReason::NoRoles));
        }

        if self
            .evaluator
            .has_permission(&roles, requirement.permission())
        {
            info!("Granted {} to '{}'", requirement, user);
            Ok(Decision::Granted)
        } else {
            let role_names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
            warn!(
                "Denied {} to '{}': not granted by roles [{}]",
                requirement,
                user,
                role_names.join(", ")
            );
            Ok(Decision::Denied(DenyReason::MissingPermission))
        }
    }

    pub async fn effective_permissions(&self, user: &UserId) -> AuthzResult<BTreeSet<Permission>> {
        let roles = self.resolver.roles_for_user(user).await?;
        let permissions = self.evaluator.effective_permissions(&roles);
        debug!("User '{}' has {} permissions", user, permissions.len());
        Ok(permissions)
    }
}
