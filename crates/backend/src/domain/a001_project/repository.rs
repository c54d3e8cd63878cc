use anyhow::{Context, Result};
use chrono::Utc;
use contracts::domain::a001_project::aggregate::Project;
use contracts::system::features::{FeatureKey, FeaturePatch, ProjectFeaturesMap};
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement, TransactionTrait};

use crate::shared::data::db::get_connection;

fn project_from_row(row: &QueryResult) -> Result<Project> {
    Ok(Project {
        id: row.try_get("", "id")?,
        code: row.try_get("", "code")?,
        name: row.try_get("", "name")?,
        address: row.try_get("", "address")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
    })
}

pub async fn insert(project: &Project) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO a001_project (id, code, name, address, is_deleted, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
            [
                project.id.clone().into(),
                project.code.clone().into(),
                project.name.clone().into(),
                project.address.clone().into(),
                project.created_at.clone().into(),
                project.updated_at.clone().into(),
            ],
        ))
        .await
        .context("Failed to insert project")?;
    Ok(())
}

pub async fn get_by_id(id: &str) -> Result<Option<Project>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT id, code, name, address, created_at, updated_at
             FROM a001_project WHERE id = ? AND is_deleted = 0",
            [id.into()],
        ))
        .await?;

    row.as_ref().map(project_from_row).transpose()
}

pub async fn list_all() -> Result<Vec<Project>> {
    let rows = get_connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT id, code, name, address, created_at, updated_at
             FROM a001_project WHERE is_deleted = 0 ORDER BY name"
                .to_string(),
        ))
        .await?;

    rows.iter().map(project_from_row).collect()
}

pub async fn count() -> Result<i64> {
    let row = get_connection()
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) AS cnt FROM a001_project".to_string(),
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("COUNT returned no rows"))?;

    Ok(row.try_get("", "cnt")?)
}

/// Stored feature rows of a project plus the latest `updated_at` among them.
///
/// Rows with a key the registry no longer knows are skipped.
pub async fn get_features(project_id: &str) -> Result<(ProjectFeaturesMap, Option<String>)> {
    let rows = get_connection()
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT feature_key, is_enabled, updated_at
             FROM a001_project_features WHERE project_id = ?",
            [project_id.into()],
        ))
        .await
        .context("Failed to load project features")?;

    let mut map = ProjectFeaturesMap::new();
    let mut latest: Option<String> = None;
    for row in rows {
        let raw_key: String = row.try_get("", "feature_key")?;
        let key = match raw_key.parse::<FeatureKey>() {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Project {}: {}", project_id, e);
                continue;
            }
        };
        map.set(key, row.try_get::<i32>("", "is_enabled")? != 0);

        let updated_at: String = row.try_get("", "updated_at")?;
        if latest.as_deref().map_or(true, |l| updated_at.as_str() > l) {
            latest = Some(updated_at);
        }
    }

    Ok((map, latest))
}

/// Upsert every entry of `patch` in one transaction
pub async fn upsert_features(
    project_id: &str,
    patch: &FeaturePatch,
    updated_by: &str,
) -> Result<()> {
    let txn = get_connection().begin().await?;
    let now = Utc::now().to_rfc3339();

    for (key, enabled) in patch.iter() {
        txn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO a001_project_features (project_id, feature_key, is_enabled, updated_at, updated_by)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(project_id, feature_key) DO UPDATE SET
                is_enabled = excluded.is_enabled,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by",
            [
                project_id.into(),
                key.as_str().into(),
                (if enabled { 1 } else { 0 }).into(),
                now.clone().into(),
                updated_by.into(),
            ],
        ))
        .await
        .with_context(|| format!("Failed to store feature '{}'", key))?;
    }

    txn.commit().await.context("Failed to commit feature update")?;
    Ok(())
}
