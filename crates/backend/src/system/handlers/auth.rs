use axum::{extract::Json, http::StatusCode};
use contracts::system::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserInfo,
};

use crate::system::auth::extractor::CurrentUser;
use crate::system::auth::jwt::{self, TokenSubject};
use crate::system::users::repository::UserRecord;
use crate::system::users::service as user_service;

fn internal_error(context: &str) -> impl FnOnce(anyhow::Error) -> StatusCode + '_ {
    move |e| {
        tracing::error!("{}: {:#}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn access_token_for(user: &UserRecord) -> Result<String, StatusCode> {
    jwt::generate_access_token(TokenSubject {
        user_id: &user.id,
        username: &user.username,
        role: user.role,
        project_id: user.project_id.as_deref(),
    })
    .await
    .map_err(internal_error("Failed to issue access token"))
}

/// POST /api/system/auth/login
pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, StatusCode> {
    let user = user_service::verify_credentials(&request.username, &request.password)
        .await
        .map_err(internal_error("Credential check failed"))?
        .ok_or_else(|| {
            tracing::warn!("Failed login for '{}'", request.username);
            StatusCode::UNAUTHORIZED
        })?;

    let access_token = access_token_for(&user).await?;
    let refresh_token = jwt::generate_refresh_token();

    store_refresh_token(&user.id, &refresh_token)
        .await
        .map_err(internal_error("Failed to store refresh token"))?;

    tracing::info!("User '{}' logged in ({})", user.username, user.role.as_str());

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

/// POST /api/system/auth/refresh
pub async fn refresh(
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, StatusCode> {
    let user_id = validate_refresh_token(&request.refresh_token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = user_service::get_by_id(&user_id)
        .await
        .map_err(internal_error("Failed to load user"))?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let access_token = access_token_for(&user).await?;

    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/system/auth/logout
pub async fn logout(Json(request): Json<RefreshRequest>) -> Result<StatusCode, StatusCode> {
    revoke_refresh_token(&request.refresh_token)
        .await
        .map_err(internal_error("Failed to revoke refresh token"))?;

    Ok(StatusCode::OK)
}

/// GET /api/system/auth/me
pub async fn current_user(CurrentUser(claims): CurrentUser) -> Result<Json<UserInfo>, StatusCode> {
    let user = user_service::get_by_id(&claims.sub)
        .await
        .map_err(internal_error("Failed to load user"))?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user.into()))
}

async fn store_refresh_token(user_id: &str, token: &str) -> anyhow::Result<()> {
    use crate::shared::data::db::get_connection;
    use chrono::Utc;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_refresh_tokens (id, user_id, token_hash, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                uuid::Uuid::new_v4().to_string().into(),
                user_id.to_string().into(),
                hash_token(token).into(),
                jwt::calculate_refresh_token_expiration().into(),
                Utc::now().to_rfc3339().into(),
            ],
        ))
        .await?;

    Ok(())
}

async fn validate_refresh_token(token: &str) -> anyhow::Result<String> {
    use crate::shared::data::db::get_connection;
    use chrono::Utc;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT user_id FROM sys_refresh_tokens
             WHERE token_hash = ? AND expires_at > ? AND revoked_at IS NULL",
            [hash_token(token).into(), Utc::now().to_rfc3339().into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(row.try_get("", "user_id")?),
        None => Err(anyhow::anyhow!("Invalid or expired refresh token")),
    }
}

async fn revoke_refresh_token(token: &str) -> anyhow::Result<()> {
    use crate::shared::data::db::get_connection;
    use chrono::Utc;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_refresh_tokens SET revoked_at = ? WHERE token_hash = ?",
            [Utc::now().to_rfc3339().into(), hash_token(token).into()],
        ))
        .await?;

    Ok(())
}

fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("refresh-1");
        assert_eq!(a, hash_token("refresh-1"));
        assert_ne!(a, hash_token("refresh-2"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
