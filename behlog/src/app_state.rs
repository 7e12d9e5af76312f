use std::sync::Arc;

use behlog_core::authorization::{
    AuthorizationGate, PermissionEvaluator, PolicyStore, RoleResolver,
};
use tracing::info;

use crate::settings::config::Settings;
use crate::stop_flag;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stop_flag: stop_flag::StopFlag,
    pub store: Arc<PolicyStore>,
    pub gate: AuthorizationGate,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn new() -> anyhow::Result<SharedAppState> {
        let settings = Settings::new()?;

        let stop_flag = stop_flag::StopFlag::new();
        stop_flag::register_signal_handler(&stop_flag);

        let store = Arc::new(PolicyStore::open(&settings.authorization.policy_path).await?);
        info!(
            "Authorization policy loaded from {}",
            settings.authorization.policy_path.display()
        );

        Ok(Self::from_parts(settings, stop_flag, store))
    }

    pub fn new_for_config_only() -> anyhow::Result<Settings> {
        Ok(Settings::new()?)
    }

    /// Wire the gate over `store`. Used by `new` and by tests that bring
    /// their own settings and store.
    pub fn from_parts(
        settings: Settings,
        stop_flag: stop_flag::StopFlag,
        store: Arc<PolicyStore>,
    ) -> SharedAppState {
        let gate = AuthorizationGate::new(
            RoleResolver::new(store.clone(), store.clone()),
            PermissionEvaluator::new(),
        );

        Arc::new(AppState {
            settings,
            stop_flag,
            store,
            gate,
        })
    }
}
