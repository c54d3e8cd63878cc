use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_project::aggregate::Project;
use contracts::system::features::{FeaturePatch, ProjectFeaturesResponse};

use crate::domain::a001_project::service::{self, FeatureServiceError};
use crate::system::auth::extractor::CurrentUser;

fn to_status(e: FeatureServiceError) -> StatusCode {
    match &e {
        FeatureServiceError::Storage(inner) => tracing::error!("Project features: {:#}", inner),
        other => tracing::warn!("Project features: {}", other),
    }
    e.status_code()
}

/// GET /api/projects
pub async fn list(CurrentUser(claims): CurrentUser) -> Result<Json<Vec<Project>>, StatusCode> {
    service::list_visible(&claims)
        .await
        .map(Json)
        .map_err(to_status)
}

/// GET /api/projects/:id/features
pub async fn get_features(
    CurrentUser(claims): CurrentUser,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectFeaturesResponse>, StatusCode> {
    service::get_features(&claims, &project_id)
        .await
        .map(Json)
        .map_err(to_status)
}

/// PATCH /api/projects/:id/features
pub async fn update_features(
    CurrentUser(claims): CurrentUser,
    Path(project_id): Path<String>,
    Json(patch): Json<FeaturePatch>,
) -> Result<Json<ProjectFeaturesResponse>, StatusCode> {
    service::update_features(&claims, &project_id, patch)
        .await
        .map(Json)
        .map_err(to_status)
}
