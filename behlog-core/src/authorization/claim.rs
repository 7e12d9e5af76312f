use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{AuthzError, AuthzResult};
use super::permission::Permission;

/// Claim type whose values are permission keys.
pub const PERMISSION_CLAIM_TYPE: &str = "Permission";

/// A single grant attached to a role.
///
/// Claims of type [`PERMISSION_CLAIM_TYPE`] are parsed into [`Permission`] when
/// they are created, so an unknown key is rejected up front instead of
/// silently never matching. Any other claim type is kept as opaque strings.
///
/// Ordering puts permission claims first (in [`Permission`] order), followed by
/// other claims ordered by type and value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawClaim", into = "RawClaim")]
pub enum Claim {
    Permission(Permission),
    Other { claim_type: String, value: String },
}

/// Wire and storage shape of a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: &str, value: &str) -> AuthzResult<Self> {
        let claim_type = claim_type.trim();
        let value = value.trim();

        if claim_type.is_empty() {
            return Err(AuthzError::Validation(
                "Claim type cannot be empty".to_string(),
            ));
        }
        if value.is_empty() {
            return Err(AuthzError::Validation(format!(
                "Claim value for type '{}' cannot be empty",
                claim_type
            )));
        }

        if claim_type.eq_ignore_ascii_case(PERMISSION_CLAIM_TYPE) {
            return Ok(Claim::Permission(value.parse()?));
        }

        Ok(Claim::Other {
            claim_type: claim_type.to_string(),
            value: value.to_string(),
        })
    }

    pub fn claim_type(&self) -> &str {
        match self {
            Claim::Permission(_) => PERMISSION_CLAIM_TYPE,
            Claim::Other { claim_type, .. } => claim_type,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Claim::Permission(permission) => permission.as_str(),
            Claim::Other { value, .. } => value,
        }
    }

    pub fn permission(&self) -> Option<Permission> {
        match self {
            Claim::Permission(permission) => Some(*permission),
            Claim::Other { .. } => None,
        }
    }

    /// True when this claim is of the given type. `Permission` is matched
    /// without ASCII case, the same way [`Claim::new`] normalises it. Every
    /// other type must match exactly, so two claims that differ only in the
    /// case of their type stay two distinct grants.
    pub fn is_of_type(&self, claim_type: &str) -> bool {
        let claim_type = claim_type.trim();
        match self {
            Claim::Permission(_) => claim_type.eq_ignore_ascii_case(PERMISSION_CLAIM_TYPE),
            Claim::Other { claim_type: own, .. } => own == claim_type,
        }
    }
}

impl From<Permission> for Claim {
    fn from(permission: Permission) -> Self {
        Claim::Permission(permission)
    }
}

impl TryFrom<RawClaim> for Claim {
    type Error = AuthzError;

    fn try_from(raw: RawClaim) -> Result<Self, Self::Error> {
        Claim::new(&raw.claim_type, &raw.value)
    }
}

impl From<Claim> for RawClaim {
    fn from(claim: Claim) -> Self {
        RawClaim {
            claim_type: claim.claim_type().to_string(),
            value: claim.value().to_string(),
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.claim_type(), self.value())
    }
}
