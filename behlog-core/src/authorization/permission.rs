use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AuthzError;

/// Permission keys a role can be granted through a `Permission` claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    #[serde(rename = "Post.View")]
    PostView,
    #[serde(rename = "Post.Create")]
    PostCreate,
    #[serde(rename = "Post.Edit")]
    PostEdit,
    #[serde(rename = "Post.Delete")]
    PostDelete,
    #[serde(rename = "Post.Publish")]
    PostPublish,
    #[serde(rename = "Category.Manage")]
    CategoryManage,
    #[serde(rename = "Tag.Manage")]
    TagManage,
    #[serde(rename = "Menu.Manage")]
    MenuManage,
    #[serde(rename = "Layout.Manage")]
    LayoutManage,
    #[serde(rename = "Language.Manage")]
    LanguageManage,
    #[serde(rename = "WebsiteOption.Manage")]
    WebsiteOptionManage,
    #[serde(rename = "Contact.View")]
    ContactView,
    #[serde(rename = "Contact.Delete")]
    ContactDelete,
    #[serde(rename = "Subscriber.Manage")]
    SubscriberManage,
    /// Read-only access to roles, their claims and members
    #[serde(rename = "Role.View")]
    RoleView,
    /// Create and delete roles, grant and revoke claims
    #[serde(rename = "Role.Manage")]
    RoleManage,
    /// Assign roles to users and revoke them
    #[serde(rename = "User.ManageRoles")]
    UserManageRoles,
}

impl Permission {
    /// Get all available permissions in display order
    pub fn all() -> Vec<Permission> {
        vec![
            Permission::PostView,
            Permission::PostCreate,
            Permission::PostEdit,
            Permission::PostDelete,
            Permission::PostPublish,
            Permission::CategoryManage,
            Permission::TagManage,
            Permission::MenuManage,
            Permission::LayoutManage,
            Permission::LanguageManage,
            Permission::WebsiteOptionManage,
            Permission::ContactView,
            Permission::ContactDelete,
            Permission::SubscriberManage,
            Permission::RoleView,
            Permission::RoleManage,
            Permission::UserManageRoles,
        ]
    }

    /// The claim value stored for this permission
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::PostView => "Post.View",
            Permission::PostCreate => "Post.Create",
            Permission::PostEdit => "Post.Edit",
            Permission::PostDelete => "Post.Delete",
            Permission::PostPublish => "Post.Publish",
            Permission::CategoryManage => "Category.Manage",
            Permission::TagManage => "Tag.Manage",
            Permission::MenuManage => "Menu.Manage",
            Permission::LayoutManage => "Layout.Manage",
            Permission::LanguageManage => "Language.Manage",
            Permission::WebsiteOptionManage => "WebsiteOption.Manage",
            Permission::ContactView => "Contact.View",
            Permission::ContactDelete => "Contact.Delete",
            Permission::SubscriberManage => "Subscriber.Manage",
            Permission::RoleView => "Role.View",
            Permission::RoleManage => "Role.Manage",
            Permission::UserManageRoles => "User.ManageRoles",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing ignores ASCII case, so `post.edit` and `Post.Edit` are the same key.
impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Permission::all()
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AuthzError::UnknownPermission(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parsing() {
        assert_eq!("Post.Edit".parse::<Permission>(), Ok(Permission::PostEdit));
        assert_eq!("post.edit".parse::<Permission>(), Ok(Permission::PostEdit));
        assert_eq!(
            " User.ManageRoles ".parse::<Permission>(),
            Ok(Permission::UserManageRoles)
        );
        assert_eq!(
            "Post.Archive".parse::<Permission>(),
            Err(AuthzError::UnknownPermission("Post.Archive".to_string()))
        );
    }

    #[test]
    fn test_every_permission_parses_from_its_own_key() {
        for permission in Permission::all() {
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
    }

    #[test]
    fn test_serde_uses_claim_value() {
        let json = serde_json::to_string(&Permission::WebsiteOptionManage).unwrap();
        assert_eq!(json, "\"WebsiteOption.Manage\"");

        let parsed: Permission = serde_json::from_str("\"Contact.Delete\"").unwrap();
        assert_eq!(parsed, Permission::ContactDelete);
    }
}
