use behlog::{app_state, http::setup_http_server, init_telemetry, settings::config::Settings};
use behlog_core::authorization::{
    AssignmentStore, AuthorizationGate, Caller, Decision, Permission, PermissionEvaluator,
    PolicyStore, RoleResolver, RoleStore, UserId,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "behlog")]
#[command(about = "Role based access control for behlog")]
#[clap(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
enum Commands {
    /// Show current configuration and exit
    Config,
    /// Start the API server (default)
    Run,
    /// Check whether a user holds a permission under the configured policy
    Check {
        /// User id as handed out by the identity layer
        user: String,
        /// Permission key, e.g. Post.Edit
        permission: Permission,
    },
    /// Assign a role (by name) to a user in the configured policy
    Assign {
        user: String,
        role: String,
    },
}

fn load_dotenv() {
    // .env.local first: dotenvy never overrides a variable that is already set
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
}

async fn open_store(settings: &Settings) -> anyhow::Result<Arc<PolicyStore>> {
    Ok(Arc::new(
        PolicyStore::open(&settings.authorization.policy_path).await?,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Config => {
            let settings = app_state::AppState::new_for_config_only()?;
            println!("{:#?}", &settings);
            return Ok(());
        }
        Commands::Check { user, permission } => {
            let settings = Settings::new()?;
            init_telemetry::init_telemetry_and_tracing(settings.debug)?;
            let store = open_store(&settings).await?;
            let gate = AuthorizationGate::new(
                RoleResolver::new(store.clone(), store.clone()),
                PermissionEvaluator::new(),
            );

            let decision = gate.authorize(&Caller::user(user.as_str()), *permission).await?;
            match decision {
                Decision::Granted => println!("{}: {} granted", user, permission),
                Decision::Denied(reason) => {
                    println!("{}: {} denied ({:?})", user, permission, reason)
                }
            }
            return Ok(());
        }
        Commands::Assign { user, role } => {
            let settings = Settings::new()?;
            init_telemetry::init_telemetry_and_tracing(settings.debug)?;
            let store = open_store(&settings).await?;

            let Some(found) = store.find_role_by_name(role).await? else {
                anyhow::bail!("Role '{}' does not exist", role);
            };
            let assigned = store.assign_role(&UserId::new(user.as_str()), found.id).await?;
            if assigned {
                println!("Assigned role '{}' to {}", found.name, user);
            } else {
                println!("{} already holds role '{}'", user, found.name);
            }
            return Ok(());
        }
        Commands::Run => {}
    }

    let app_state = app_state::AppState::new().await?;
    init_telemetry::init_telemetry_and_tracing(app_state.settings.debug)?;

    let handle = setup_http_server(app_state.clone(), &app_state.settings.api.bind_address).await?;

    handle.await??;
    info!("All tasks are done");

    Ok(())
}
