use anyhow::Result;
use contracts::system::roles::UserRole;

use crate::domain::a001_project::{repository as project_repository, service as project_service};
use crate::system::users::{repository as user_repository, service as user_service};

const DEFAULT_PROJECT_CODE: &str = "MV-001";
const DEFAULT_PROJECT_NAME: &str = "My Village";

/// Ensure there is at least one project, with every feature enabled
pub async fn ensure_default_project_exists() -> Result<()> {
    if project_repository::count().await? > 0 {
        return Ok(());
    }

    tracing::info!("No projects found. Creating default project...");
    let id = project_service::create_with_all_features(
        DEFAULT_PROJECT_CODE,
        DEFAULT_PROJECT_NAME,
        None,
    )
    .await?;
    tracing::info!("Default project '{}' created: {}", DEFAULT_PROJECT_NAME, id);

    Ok(())
}

/// Ensure a super-admin exists (create one if the users table is empty)
pub async fn ensure_admin_user_exists() -> Result<()> {
    if user_repository::count_users().await? > 0 {
        return Ok(());
    }

    tracing::info!("No users found. Creating default super-admin...");

    let admin_id = user_service::create(user_service::NewUser {
        username: "admin".to_string(),
        password: "admin".to_string(),
        full_name: Some("Administrator".to_string()),
        role: UserRole::SuperAdmin,
        project_id: None,
    })
    .await?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default super-admin created!");
    tracing::warn!("  Username: admin");
    tracing::warn!("  Password: admin");
    tracing::warn!("  User ID: {}", admin_id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(())
}
