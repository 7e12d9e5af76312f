use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::error::{AuthzError, AuthzResult};
use super::role::{Role, UserId};
use super::store::{AssignmentStore, RoleStore};

/// Computes which roles a user currently holds.
///
/// Nothing is cached: every call reads the stores, so a revoked assignment
/// stops counting on the very next resolution.
#[derive(Clone)]
pub struct RoleResolver {
    roles: Arc<dyn RoleStore>,
    assignments: Arc<dyn AssignmentStore>,
}

impl RoleResolver {
    pub fn new(roles: Arc<dyn RoleStore>, assignments: Arc<dyn AssignmentStore>) -> Self {
        Self { roles, assignments }
    }

    /// Roles assigned to `user`, ordered by name. Assignments pointing at a
    /// role that has been deleted in the meantime are skipped.
    pub async fn roles_for_user(&self, user: &UserId) -> AuthzResult<Vec<Role>> {
        let role_ids = self.assignments.role_ids_for_user(user).await?;

        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            match self.roles.get_role(role_id).await {
                Ok(role) => roles.push(role),
                Err(AuthzError::RoleNotFound(_)) => {
                    debug!(
                        "Skipping assignment of user '{}' to deleted role {}",
                        user, role_id
                    );
                }
                Err(e) => return Err(e),
            }
        }

        roles.sort_by_cached_key(|r| (r.name.to_lowercase(), r.id));
        debug!("Resolved {} roles for user '{}'", roles.len(), user);
        Ok(roles)
    }

    pub async fn is_user_in_role(&self, user: &UserId, role_name: &str) -> AuthzResult<bool> {
        let Some(role) = self.roles.find_role_by_name(role_name).await? else {
            return Ok(false);
        };
        Ok(self
            .assignments
            .role_ids_for_user(user)
            .await?
            .contains(&role.id))
    }

    pub async fn users_in_role(&self, role_id: Uuid) -> AuthzResult<Vec<UserId>> {
        self.assignments.users_in_role(role_id).await
    }

    /// Every role paired with the number of users holding it, ordered by name.
    pub async fn roles_with_user_counts(&self) -> AuthzResult<Vec<(Role, usize)>> {
        let roles = self.roles.list_roles().await?;
        let mut counted = Vec::with_capacity(roles.len());
        for role in roles {
            let users = match self.assignments.users_in_role(role.id).await {
                Ok(users) => users.len(),
                Err(AuthzError::RoleNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            counted.push((role, users));
        }
        Ok(counted)
    }
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver").finish_non_exhaustive()
    }
}
