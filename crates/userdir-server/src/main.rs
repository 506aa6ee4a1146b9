//! User directory server: application entry point.

use tracing_subscriber::EnvFilter;
use userdir_db::repository::{
    SurrealPermissionRepository, SurrealRoleRepository, SurrealUserRepository,
};
use userdir_db::{DbConfig, DbManager, SurrealUnitOfWorkFactory};
use userdir_service::{DirectoryConfig, UserDirectoryService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("userdir=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting user directory...");

    let manager = DbManager::connect(&DbConfig::from_env()).await?;
    let db = manager.client().clone();
    userdir_db::run_migrations(&db).await?;

    let config = DirectoryConfig::from_env();
    tracing::info!(
        default_page_size = config.default_page_size,
        peppered = config.pepper.is_some(),
        "Directory configured"
    );

    let service = UserDirectoryService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealPermissionRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealUnitOfWorkFactory::new(db),
        config,
    );

    let roles = service.list_roles().await?;
    tracing::info!(roles = roles.len(), "User directory ready");

    tokio::signal::ctrl_c().await?;

    tracing::info!("User directory stopped.");
    Ok(())
}
