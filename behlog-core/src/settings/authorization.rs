use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct AuthorizationSettings {
    /// YAML file holding roles, their claims and user assignments. Created
    /// with a single administrator role when missing.
    #[serde(default = "default_policy_path")]
    pub policy_path: PathBuf,
}

fn default_policy_path() -> PathBuf {
    PathBuf::from("config/policy.yaml")
}

impl Default for AuthorizationSettings {
    fn default() -> Self {
        Self {
            policy_path: default_policy_path(),
        }
    }
}

impl AuthorizationSettings {
    pub fn new(policy_path: impl Into<PathBuf>) -> Self {
        Self {
            policy_path: policy_path.into(),
        }
    }
}
