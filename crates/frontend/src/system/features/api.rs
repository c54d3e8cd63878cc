use contracts::system::features::{FeaturePatch, ProjectFeaturesMap, ProjectFeaturesResponse};
use gloo_net::http::{Request, Response};

use super::query::{FeaturesApi, LocalFuture};
use crate::shared::api_utils::{api_url, with_auth};

fn features_url(project_id: &str) -> String {
    api_url(&format!(
        "/api/projects/{}/features",
        urlencoding::encode(project_id)
    ))
}

async fn read_features(response: Response) -> Result<ProjectFeaturesMap, String> {
    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("HTTP {}: {}", response.status(), body));
    }

    response
        .json::<ProjectFeaturesResponse>()
        .await
        .map(|r| r.features)
        .map_err(|e| format!("Failed to parse response: {}", e))
}

pub async fn fetch_features(project_id: String) -> Result<ProjectFeaturesMap, String> {
    let response = with_auth(Request::get(&features_url(&project_id)))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    read_features(response).await
}

pub async fn update_features(
    project_id: String,
    patch: FeaturePatch,
) -> Result<ProjectFeaturesMap, String> {
    let response = with_auth(Request::patch(&features_url(&project_id)))
        .json(&patch)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    read_features(response).await
}

/// Feature storage backed by the HTTP API
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFeaturesApi;

impl FeaturesApi for HttpFeaturesApi {
    fn fetch_features(&self, project_id: &str) -> LocalFuture<Result<ProjectFeaturesMap, String>> {
        Box::pin(fetch_features(project_id.to_string()))
    }

    fn update_features(
        &self,
        project_id: &str,
        patch: &FeaturePatch,
    ) -> LocalFuture<Result<ProjectFeaturesMap, String>> {
        Box::pin(update_features(project_id.to_string(), patch.clone()))
    }
}
