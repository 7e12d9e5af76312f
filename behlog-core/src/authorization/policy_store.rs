use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::claim::Claim;
use super::error::{AuthzError, AuthzResult};
use super::permission::Permission;
use super::role::{Role, UserId};
use super::store::{AssignmentStore, ClaimChange, ClaimSync, RoleStore};

/// Everything the role store persists, serialized as YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub assignments: BTreeMap<UserId, BTreeSet<Uuid>>,
}

impl PolicyDocument {
    /// Policy used when no policy file exists yet: a single administrator
    /// role holding every permission and no assignments.
    pub fn default_policy() -> Self {
        Self {
            roles: vec![Role::new("Administrator", "Full access to every area")
                .with_permissions(Permission::all())],
            assignments: BTreeMap::new(),
        }
    }

    fn role(&self, id: Uuid) -> AuthzResult<&Role> {
        self.roles
            .iter()
            .find(|r| r.id == id)
            .ok_or(AuthzError::RoleNotFound(id))
    }

    fn role_mut(&mut self, id: Uuid) -> AuthzResult<&mut Role> {
        self.roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AuthzError::RoleNotFound(id))
    }

    fn find_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| same_name(&r.name, name))
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Role and assignment store backed by a YAML policy file.
///
/// The whole document lives behind one `RwLock`. Mutations clone it, apply
/// the change to the clone, write the clone to disk and only then publish it,
/// so a failed write leaves the visible state untouched.
pub struct PolicyStore {
    document: RwLock<PolicyDocument>,
    path: Option<PathBuf>,
}

impl PolicyStore {
    /// Open the policy file at `path`, creating it from
    /// [`PolicyDocument::default_policy`] if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> AuthzResult<Self> {
        let path = path.as_ref().to_path_buf();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_norway::from_str::<PolicyDocument>(&content).map_err(|e| {
                AuthzError::StoreUnavailable(format!(
                    "Failed to parse policy file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Policy file not found at {}, creating it with the default policy",
                    path.display()
                );
                let document = PolicyDocument::default_policy();
                write_document(&path, &document).await?;
                document
            }
            Err(e) => {
                return Err(AuthzError::StoreUnavailable(format!(
                    "Failed to read policy file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        info!(
            "Policy store loaded from {} with {} roles, {} users with assignments",
            path.display(),
            document.roles.len(),
            document.assignments.len()
        );

        Ok(Self {
            document: RwLock::new(document),
            path: Some(path),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(document: PolicyDocument) -> Self {
        Self {
            document: RwLock::new(document),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn snapshot(&self) -> PolicyDocument {
        self.document.read().await.clone()
    }

    async fn mutate<T, F>(&self, f: F) -> AuthzResult<T>
    where
        F: FnOnce(&mut PolicyDocument) -> AuthzResult<T> + Send,
    {
        let mut document = self.document.write().await;
        let mut draft = document.clone();
        let outcome = f(&mut draft)?;

        if draft != *document {
            if let Some(path) = &self.path {
                write_document(path, &draft).await?;
            }
            *document = draft;
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Write to a sibling temp file, fsync, then rename over the target.
async fn write_document(path: &Path, document: &PolicyDocument) -> AuthzResult<()> {
    let yaml = serde_norway::to_string(document)
        .map_err(|e| AuthzError::StoreUnavailable(format!("Failed to serialize policy: {}", e)))?;

    let unavailable = |e: std::io::Error| {
        AuthzError::StoreUnavailable(format!(
            "Failed to write policy file {}: {}",
            path.display(),
            e
        ))
    };

    let tmp_path = path.with_extension("yaml.tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(unavailable)?;
    file.write_all(yaml.as_bytes()).await.map_err(unavailable)?;
    file.sync_all().await.map_err(unavailable)?;
    drop(file);

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(unavailable)?;

    debug!("Policy written to {}", path.display());
    Ok(())
}

#[async_trait]
impl RoleStore for PolicyStore {
    async fn get_role(&self, id: Uuid) -> AuthzResult<Role> {
        let document = self.document.read().await;
        document.role(id).cloned()
    }

    async fn find_role_by_name(&self, name: &str) -> AuthzResult<Option<Role>> {
        let document = self.document.read().await;
        Ok(document.find_by_name(name).cloned())
    }

    async fn list_roles(&self) -> AuthzResult<Vec<Role>> {
        let document = self.document.read().await;
        let mut roles = document.roles.clone();
        roles.sort_by_cached_key(|r| (r.name.to_lowercase(), r.id));
        Ok(roles)
    }

    async fn create_role(&self, name: &str, description: &str) -> AuthzResult<Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthzError::Validation(
                "Role name cannot be empty".to_string(),
            ));
        }

        let role = self
            .mutate(|document| {
                if document.find_by_name(name).is_some() {
                    return Err(AuthzError::RoleAlreadyExists(name.to_string()));
                }
                let role = Role::new(name, description.trim());
                document.roles.push(role.clone());
                Ok(role)
            })
            .await?;

        info!("Created role '{}' ({})", role.name, role.id);
        Ok(role)
    }

    async fn delete_role(&self, id: Uuid) -> AuthzResult<()> {
        let removed = self
            .mutate(|document| {
                let index = document
                    .roles
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or(AuthzError::RoleNotFound(id))?;
                let role = document.roles.remove(index);

                for role_ids in document.assignments.values_mut() {
                    role_ids.remove(&id);
                }
                document.assignments.retain(|_, role_ids| !role_ids.is_empty());
                Ok(role)
            })
            .await?;

        info!("Deleted role '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    async fn add_claim(&self, role_id: Uuid, claim: Claim) -> AuthzResult<(ClaimChange, Role)> {
        let log_claim = claim.clone();
        let (change, role) = self
            .mutate(move |document| {
                let role = document.role_mut(role_id)?;
                if role.has_claim(&claim) {
                    return Ok((ClaimChange::Unchanged, role.clone()));
                }
                role.claims.insert(claim);
                role.touch();
                Ok((ClaimChange::Added, role.clone()))
            })
            .await?;

        match change {
            ClaimChange::Added => info!("Granted claim {} to role {}", log_claim, role_id),
            ClaimChange::Unchanged => {
                debug!("Role {} already holds claim {}", role_id, log_claim)
            }
        }
        Ok((change, role))
    }

    async fn remove_claim(&self, role_id: Uuid, claim: &Claim) -> AuthzResult<()> {
        self.mutate(|document| {
            let role = document.role_mut(role_id)?;
            if !role.claims.remove(claim) {
                return Err(AuthzError::ClaimNotFound {
                    role_id,
                    claim_type: claim.claim_type().to_string(),
                    value: claim.value().to_string(),
                });
            }
            role.touch();
            Ok(())
        })
        .await?;

        info!("Revoked claim {} from role {}", claim, role_id);
        Ok(())
    }

    async fn set_claims_of_type(
        &self,
        role_id: Uuid,
        claim_type: &str,
        values: &[String],
        expected_version: Option<u64>,
    ) -> AuthzResult<ClaimSync> {
        let desired = values
            .iter()
            .map(|value| Claim::new(claim_type, value))
            .collect::<AuthzResult<BTreeSet<Claim>>>()?;

        let sync = self
            .mutate(|document| {
                let role = document.role_mut(role_id)?;

                if let Some(expected) = expected_version {
                    if role.version != expected {
                        return Err(AuthzError::VersionConflict {
                            role_id,
                            expected,
                            actual: role.version,
                        });
                    }
                }

                let current: BTreeSet<Claim> = role.claims_of_type(claim_type).cloned().collect();
                let added: Vec<Claim> = desired.difference(&current).cloned().collect();
                let removed: Vec<Claim> = current.difference(&desired).cloned().collect();

                for claim in &removed {
                    role.claims.remove(claim);
                }
                role.claims.extend(added.iter().cloned());
                if !added.is_empty() || !removed.is_empty() {
                    role.touch();
                }

                Ok(ClaimSync {
                    added: added.iter().map(|c| c.value().to_string()).collect(),
                    removed: removed.iter().map(|c| c.value().to_string()).collect(),
                    version: role.version,
                })
            })
            .await?;

        info!(
            "Synced '{}' claims on role {}: {} added, {} removed",
            claim_type,
            role_id,
            sync.added.len(),
            sync.removed.len()
        );
        Ok(sync)
    }
}

#[async_trait]
impl AssignmentStore for PolicyStore {
    async fn assign_role(&self, user: &UserId, role_id: Uuid) -> AuthzResult<bool> {
        let added = self
            .mutate(|document| {
                document.role(role_id)?;
                Ok(document
                    .assignments
                    .entry(user.clone())
                    .or_default()
                    .insert(role_id))
            })
            .await?;

        if added {
            info!("Assigned role {} to user '{}'", role_id, user);
        }
        Ok(added)
    }

    async fn unassign_role(&self, user: &UserId, role_id: Uuid) -> AuthzResult<()> {
        self.mutate(|document| {
            let removed = document
                .assignments
                .get_mut(user)
                .map(|role_ids| role_ids.remove(&role_id))
                .unwrap_or(false);
            if !removed {
                return Err(AuthzError::AssignmentNotFound {
                    user: user.clone(),
                    role_id,
                });
            }
            document.assignments.retain(|_, role_ids| !role_ids.is_empty());
            Ok(())
        })
        .await?;

        info!("Removed role {} from user '{}'", role_id, user);
        Ok(())
    }

    async fn role_ids_for_user(&self, user: &UserId) -> AuthzResult<BTreeSet<Uuid>> {
        let document = self.document.read().await;
        Ok(document.assignments.get(user).cloned().unwrap_or_default())
    }

    async fn users_in_role(&self, role_id: Uuid) -> AuthzResult<Vec<UserId>> {
        let document = self.document.read().await;
        document.role(role_id)?;
        Ok(document
            .assignments
            .iter()
            .filter(|(_, role_ids)| role_ids.contains(&role_id))
            .map(|(user, _)| user.clone())
            .collect())
    }
}
