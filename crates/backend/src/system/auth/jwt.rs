use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use contracts::system::roles::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;
const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 90;
const JWT_SECRET_KEY: &str = "jwt_secret";

/// Subject of an access token
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub role: UserRole,
    pub project_id: Option<&'a str>,
}

pub async fn generate_access_token(subject: TokenSubject<'_>) -> Result<String> {
    let secret = get_jwt_secret().await?;
    encode_access_token(&subject, &secret)
}

fn encode_access_token(subject: &TokenSubject<'_>, secret: &str) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize;

    let claims = TokenClaims {
        sub: subject.user_id.to_string(),
        username: subject.username.to_string(),
        role: subject.role,
        project_id: subject.project_id.map(str::to_string),
        exp,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub async fn validate_token(token: &str) -> Result<TokenClaims> {
    let secret = get_jwt_secret().await?;
    decode_access_token(token, &secret)
}

fn decode_access_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// Opaque refresh token; only its hash is stored
pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn calculate_refresh_token_expiration() -> String {
    (Utc::now() + chrono::Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)).to_rfc3339()
}

/// Read the signing secret from sys_settings, generating it on first use
pub async fn get_jwt_secret() -> Result<String> {
    match get_jwt_secret_from_db().await {
        Ok(Some(secret)) => Ok(secret),
        Ok(None) => {
            save_jwt_secret_to_db(&generate_jwt_secret()).await?;
            tracing::info!("Generated new JWT secret");
            // Re-read: a concurrent request may have stored its secret first
            get_jwt_secret_from_db()
                .await?
                .ok_or_else(|| anyhow::anyhow!("JWT secret missing after insert"))
        }
        Err(e) => Err(e.context("Failed to read JWT secret")),
    }
}

/// 256 random bits, base64-encoded
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db() -> Result<Option<String>> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get("", "value")?)),
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(secret: &str) -> Result<()> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let now = Utc::now().to_rfc3339();

    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT OR IGNORE INTO sys_settings (key, value, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                JWT_SECRET_KEY.into(),
                secret.to_string().into(),
                "Auto-generated JWT secret".into(),
                now.clone().into(),
                now.into(),
            ],
        ))
        .await
        .context("Failed to store JWT secret")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_carry_role_and_project() {
        let secret = generate_jwt_secret();
        let token = encode_access_token(
            &TokenSubject {
                user_id: "u-1",
                username: "guard",
                role: UserRole::Security,
                project_id: Some("p-1"),
            },
            &secret,
        )
        .unwrap();

        let claims = decode_access_token(&token, &secret).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, UserRole::Security);
        assert_eq!(claims.project_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = encode_access_token(
            &TokenSubject {
                user_id: "u-1",
                username: "admin",
                role: UserRole::SuperAdmin,
                project_id: None,
            },
            &generate_jwt_secret(),
        )
        .unwrap();

        assert!(decode_access_token(&token, &generate_jwt_secret()).is_err());
    }
}
