use axum::http::StatusCode;
use chrono::Utc;
use contracts::domain::a001_project::aggregate::Project;
use contracts::system::auth::TokenClaims;
use contracts::system::features::{FeaturePatch, ProjectFeaturesMap, ProjectFeaturesResponse};
use thiserror::Error;

use super::repository;

#[derive(Debug, Error)]
pub enum FeatureServiceError {
    #[error("access to project {0} denied")]
    Forbidden(String),

    #[error("project {0} not found")]
    ProjectNotFound(String),

    #[error("feature patch is empty")]
    EmptyPatch,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl FeatureServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeatureServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            FeatureServiceError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
            FeatureServiceError::EmptyPatch => StatusCode::BAD_REQUEST,
            FeatureServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

type Result<T> = std::result::Result<T, FeatureServiceError>;

fn ensure_can_view(claims: &TokenClaims, project_id: &str) -> Result<()> {
    if claims
        .role
        .can_view_project(claims.project_id.as_deref(), project_id)
    {
        Ok(())
    } else {
        Err(FeatureServiceError::Forbidden(project_id.to_string()))
    }
}

fn ensure_can_manage(claims: &TokenClaims, project_id: &str) -> Result<()> {
    if claims
        .role
        .can_manage_features(claims.project_id.as_deref(), project_id)
    {
        Ok(())
    } else {
        Err(FeatureServiceError::Forbidden(project_id.to_string()))
    }
}

async fn ensure_project_exists(project_id: &str) -> Result<()> {
    match repository::get_by_id(project_id).await? {
        Some(_) => Ok(()),
        None => Err(FeatureServiceError::ProjectNotFound(project_id.to_string())),
    }
}

/// Projects visible to the caller: all of them for a super-admin, otherwise their own
pub async fn list_visible(claims: &TokenClaims) -> Result<Vec<Project>> {
    if claims.role.is_super_admin() {
        return Ok(repository::list_all().await?);
    }
    match claims.project_id.as_deref() {
        Some(id) => Ok(repository::get_by_id(id).await?.into_iter().collect()),
        None => Ok(Vec::new()),
    }
}

pub async fn get_features(
    claims: &TokenClaims,
    project_id: &str,
) -> Result<ProjectFeaturesResponse> {
    ensure_can_view(claims, project_id)?;
    ensure_project_exists(project_id).await?;

    let (features, updated_at) = repository::get_features(project_id).await?;

    Ok(ProjectFeaturesResponse {
        project_id: project_id.to_string(),
        features,
        updated_at,
    })
}

/// Apply a partial update; concurrent updates resolve as last write wins per key
pub async fn update_features(
    claims: &TokenClaims,
    project_id: &str,
    patch: FeaturePatch,
) -> Result<ProjectFeaturesResponse> {
    ensure_can_manage(claims, project_id)?;
    if patch.is_empty() {
        return Err(FeatureServiceError::EmptyPatch);
    }
    ensure_project_exists(project_id).await?;

    repository::upsert_features(project_id, &patch, &claims.username).await?;

    tracing::info!(
        "User '{}' updated features of project {}: {}",
        claims.username,
        project_id,
        describe_patch(&patch)
    );

    get_features(claims, project_id).await
}

/// Create a project with every registry feature enabled
pub async fn create_with_all_features(
    code: &str,
    name: &str,
    address: Option<String>,
) -> anyhow::Result<String> {
    let now = Utc::now().to_rfc3339();
    let project = Project {
        id: uuid::Uuid::new_v4().to_string(),
        code: code.to_string(),
        name: name.to_string(),
        address,
        created_at: now.clone(),
        updated_at: now,
    };
    repository::insert(&project).await?;

    let all_enabled = ProjectFeaturesMap::all(true);
    let patch = all_enabled
        .iter()
        .fold(FeaturePatch::new(), |p, (k, v)| p.with(k, v));
    repository::upsert_features(&project.id, &patch, "system").await?;

    Ok(project.id)
}

fn describe_patch(patch: &FeaturePatch) -> String {
    patch
        .iter()
        .map(|(k, v)| format!("{}={}", k, if v { "on" } else { "off" }))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::features::FeatureKey;
    use contracts::system::roles::UserRole;

    fn claims(role: UserRole, project_id: Option<&str>) -> TokenClaims {
        TokenClaims {
            sub: "u-1".to_string(),
            username: "tester".to_string(),
            role,
            project_id: project_id.map(str::to_string),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_resident_of_other_project_is_forbidden() {
        let err = ensure_can_view(&claims(UserRole::Resident, Some("p-1")), "p-2").unwrap_err();
        assert!(matches!(err, FeatureServiceError::Forbidden(ref id) if id == "p-2"));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_only_admins_manage_features() {
        assert!(ensure_can_manage(&claims(UserRole::Admin, Some("p-1")), "p-1").is_ok());
        assert!(ensure_can_manage(&claims(UserRole::SuperAdmin, None), "p-9").is_ok());
        assert!(ensure_can_manage(&claims(UserRole::Security, Some("p-1")), "p-1").is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            FeatureServiceError::ProjectNotFound("p".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FeatureServiceError::EmptyPatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FeatureServiceError::Storage(anyhow::anyhow!("disk")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_describe_patch() {
        let patch = FeaturePatch::new()
            .with(FeatureKey::Maintenance, false)
            .with(FeatureKey::Sos, true);
        assert_eq!(describe_patch(&patch), "maintenance=off, sos=on");
    }

    mod storage {
        use super::*;
        use crate::domain::a001_project::repository;
        use crate::shared::data::db::{get_connection, initialize_database_url};
        use contracts::system::features::FEATURE_KEYS;
        use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

        fn patch(key: FeatureKey, enabled: bool) -> FeaturePatch {
            FeaturePatch::new().with(key, enabled)
        }

        async fn update_merges_into_stored_map() {
            let id = create_with_all_features("merge", "Merge", None).await.unwrap();
            let admin = claims(UserRole::Admin, Some(&id));

            let response = update_features(&admin, &id, patch(FeatureKey::Maintenance, false))
                .await
                .unwrap();

            assert_eq!(response.project_id, id);
            assert!(response.updated_at.is_some());
            assert_eq!(response.features.len(), FEATURE_KEYS.len());
            for key in FEATURE_KEYS {
                assert_eq!(
                    response.features.is_enabled(key),
                    key != FeatureKey::Maintenance,
                    "{}",
                    key
                );
            }
        }

        async fn upsert_is_last_write_wins_per_key() {
            let id = create_with_all_features("lww", "Last write", None).await.unwrap();

            repository::upsert_features(&id, &patch(FeatureKey::Maintenance, true), "a")
                .await
                .unwrap();
            repository::upsert_features(&id, &patch(FeatureKey::Maintenance, false), "b")
                .await
                .unwrap();

            let (map, _) = repository::get_features(&id).await.unwrap();
            assert!(!map.is_enabled(FeatureKey::Maintenance));
            assert!(map.is_enabled(FeatureKey::Sos));
            assert_eq!(map.len(), FEATURE_KEYS.len());
        }

        async fn unknown_stored_keys_are_skipped() {
            let id = create_with_all_features("legacy", "Legacy", None).await.unwrap();
            get_connection()
                .execute(Statement::from_sql_and_values(
                    DatabaseBackend::Sqlite,
                    "INSERT INTO a001_project_features (project_id, feature_key, is_enabled, updated_at)
                     VALUES (?, 'billing', 1, '2024-01-01T00:00:00Z')",
                    [id.clone().into()],
                ))
                .await
                .unwrap();

            let (map, _) = repository::get_features(&id).await.unwrap();
            assert_eq!(map.len(), FEATURE_KEYS.len());
            assert!(map.iter().all(|(key, _)| FEATURE_KEYS.contains(&key)));
        }

        async fn unknown_project_is_not_found() {
            let root = claims(UserRole::SuperAdmin, None);

            let err = get_features(&root, "missing").await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

            let err = update_features(&root, "missing", patch(FeatureKey::Sos, false))
                .await
                .unwrap_err();
            assert!(matches!(err, FeatureServiceError::ProjectNotFound(ref id) if id == "missing"));
        }

        async fn empty_patch_is_rejected() {
            let id = create_with_all_features("empty", "Empty", None).await.unwrap();
            let admin = claims(UserRole::Admin, Some(&id));

            let err = update_features(&admin, &id, FeaturePatch::new()).await.unwrap_err();
            assert!(matches!(err, FeatureServiceError::EmptyPatch));
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

            let (map, _) = repository::get_features(&id).await.unwrap();
            assert_eq!(map, ProjectFeaturesMap::all(true));
        }

        // The scenarios share one in-memory database and its runtime
        #[tokio::test]
        async fn test_project_features_in_sqlite() {
            initialize_database_url("sqlite::memory:").await.unwrap();

            update_merges_into_stored_map().await;
            upsert_is_last_write_wins_per_key().await;
            unknown_stored_keys_are_skipped().await;
            unknown_project_is_not_found().await;
            empty_patch_is_rejected().await;
        }
    }
}
