use std::collections::BTreeSet;

use super::permission::Permission;
use super::role::Role;

/// Decides whether a set of roles grants a permission.
///
/// The effective permission set is the plain union of every role's
/// `Permission` claims. There is no inheritance, negation or priority, and
/// keys match exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEvaluator;

impl PermissionEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn effective_permissions<'a>(
        &self,
        roles: impl IntoIterator<Item = &'a Role>,
    ) -> BTreeSet<Permission> {
        roles.into_iter().flat_map(Role::permissions).collect()
    }

    /// An empty role set never grants anything.
    pub fn has_permission(&self, roles: &[Role], required: Permission) -> bool {
        if roles.is_empty() {
            return false;
        }
        self.effective_permissions(roles).contains(&required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, permissions: &[Permission]) -> Role {
        Role::new(name, "").with_permissions(permissions.iter().copied())
    }

    #[test]
    fn test_empty_role_set_is_never_granted() {
        let evaluator = PermissionEvaluator::new();
        for permission in Permission::all() {
            assert!(!evaluator.has_permission(&[], permission));
        }
    }

    #[test]
    fn test_role_with_claim_is_granted() {
        let evaluator = PermissionEvaluator::new();
        for permission in Permission::all() {
            let roles = [role("Holder", &[permission])];
            assert!(evaluator.has_permission(&roles, permission));
        }
    }

    #[test]
    fn test_role_without_claims_is_denied() {
        let evaluator = PermissionEvaluator::new();
        let roles = [role("Empty", &[])];
        assert!(!evaluator.has_permission(&roles, Permission::PostView));
    }

    #[test]
    fn test_union_of_role_sets() {
        let evaluator = PermissionEvaluator::new();
        let groups: Vec<Vec<Role>> = vec![
            vec![],
            vec![role("Editor", &[Permission::PostEdit])],
            vec![role("Moderator", &[Permission::ContactView, Permission::ContactDelete])],
            vec![
                role("Author", &[Permission::PostCreate]),
                role("Viewer", &[Permission::PostView]),
            ],
        ];

        for r1 in &groups {
            for r2 in &groups {
                let union: Vec<Role> = r1.iter().chain(r2.iter()).cloned().collect();
                for permission in Permission::all() {
                    assert_eq!(
                        evaluator.has_permission(&union, permission),
                        evaluator.has_permission(r1, permission)
                            || evaluator.has_permission(r2, permission),
                        "union property violated for {}",
                        permission
                    );
                }
            }
        }
    }

    #[test]
    fn test_effective_permissions_ignore_other_claim_types() {
        let mut website = role("Website", &[]);
        website
            .claims
            .insert(crate::authorization::Claim::new("Website", "Post.Edit").unwrap());

        let evaluator = PermissionEvaluator::new();
        assert!(evaluator.effective_permissions([&website]).is_empty());
        assert!(!evaluator.has_permission(&[website], Permission::PostEdit));
    }
}
