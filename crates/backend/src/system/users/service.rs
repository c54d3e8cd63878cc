use anyhow::Result;
use chrono::Utc;
use contracts::system::auth::UserInfo;
use contracts::system::roles::UserRole;

use super::repository::{self, UserRecord};
use crate::system::auth::password;

/// Input for creating a user
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub project_id: Option<String>,
}

pub async fn create(new_user: NewUser) -> Result<String> {
    if new_user.username.trim().is_empty() {
        return Err(anyhow::anyhow!("Username cannot be empty"));
    }

    if repository::get_by_username(&new_user.username).await?.is_some() {
        return Err(anyhow::anyhow!("Username already exists"));
    }

    // Only a super-admin lives outside a project
    if !new_user.role.is_super_admin() && new_user.project_id.is_none() {
        return Err(anyhow::anyhow!(
            "Role '{}' requires a project",
            new_user.role.as_str()
        ));
    }

    password::validate_password_strength(&new_user.password)?;
    let password_hash = password::hash_password(&new_user.password)?;

    let now = Utc::now().to_rfc3339();
    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        username: new_user.username,
        full_name: new_user.full_name,
        role: new_user.role,
        project_id: new_user.project_id,
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
    };

    repository::create_with_password(&user, &password_hash).await?;

    Ok(user.id)
}

pub async fn get_by_id(id: &str) -> Result<Option<UserRecord>> {
    repository::get_by_id(id).await
}

/// Returns the user when the password matches; `None` for unknown user or wrong password
pub async fn verify_credentials(username: &str, password: &str) -> Result<Option<UserRecord>> {
    let user = match repository::get_by_username(username).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if !user.is_active {
        tracing::warn!("Login attempt for inactive user {}", username);
        return Ok(None);
    }

    let password_hash = repository::get_password_hash(&user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        return Ok(None);
    }

    if let Err(e) = repository::update_last_login(&user.id).await {
        tracing::warn!("Failed to update last login for {}: {:#}", user.id, e);
    }

    Ok(Some(user))
}

impl From<UserRecord> for UserInfo {
    fn from(user: UserRecord) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            project_id: user.project_id,
        }
    }
}
