use anyhow::{Context, Result};
use contracts::system::roles::UserRole;
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement};

use crate::shared::data::db::get_connection;

/// Row of `sys_users` without the password hash
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub project_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
}

const USER_COLUMNS: &str =
    "id, username, full_name, role, project_id, is_active, created_at, updated_at, last_login_at";

fn from_row(row: &QueryResult) -> Result<UserRecord> {
    let role: String = row.try_get("", "role")?;
    Ok(UserRecord {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        full_name: row.try_get("", "full_name")?,
        role: UserRole::parse(&role).ok_or_else(|| anyhow::anyhow!("Unknown role '{}'", role))?,
        project_id: row.try_get("", "project_id")?,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
    })
}

pub async fn create_with_password(user: &UserRecord, password_hash: &str) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_users (id, username, password_hash, full_name, role, project_id, is_active, created_at, updated_at, last_login_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            [
                user.id.clone().into(),
                user.username.clone().into(),
                password_hash.to_string().into(),
                user.full_name.clone().into(),
                user.role.as_str().into(),
                user.project_id.clone().into(),
                (if user.is_active { 1 } else { 0 }).into(),
                user.created_at.clone().into(),
                user.updated_at.clone().into(),
                user.last_login_at.clone().into(),
            ],
        ))
        .await
        .context("Failed to insert user")?;

    Ok(())
}

pub async fn get_by_id(id: &str) -> Result<Option<UserRecord>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} FROM sys_users WHERE id = ?", USER_COLUMNS),
            [id.into()],
        ))
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn get_by_username(username: &str) -> Result<Option<UserRecord>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} FROM sys_users WHERE username = ?", USER_COLUMNS),
            [username.into()],
        ))
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn get_password_hash(user_id: &str) -> Result<Option<String>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

pub async fn update_last_login(user_id: &str) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_users SET last_login_at = ? WHERE id = ?",
            [chrono::Utc::now().to_rfc3339().into(), user_id.into()],
        ))
        .await?;
    Ok(())
}

pub async fn count_users() -> Result<i64> {
    let row = get_connection()
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) AS cnt FROM sys_users".to_string(),
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("COUNT returned no rows"))?;

    Ok(row.try_get("", "cnt")?)
}
