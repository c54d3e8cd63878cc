//! Reactive fixtures shared by the feature tests.

use any_spawner::Executor;
use contracts::system::auth::UserInfo;
use contracts::system::features::{FeaturePatch, ProjectFeaturesMap};
use contracts::system::roles::UserRole;
use leptos::prelude::*;
use std::future::Future;
use std::sync::Arc;

use super::hooks::{provide_feature_query, FeatureQueryContext};
use super::query::{FeaturesApi, LocalFuture};
use crate::layout::global_context::AppGlobalContext;
use crate::system::auth::context::AuthState;

pub const PROJECT: &str = "p-1";

/// Backend stub serving one fixed map; `None` never answers
pub struct FixedFeaturesApi(pub Option<ProjectFeaturesMap>);

impl FeaturesApi for FixedFeaturesApi {
    fn fetch_features(&self, _project_id: &str) -> LocalFuture<Result<ProjectFeaturesMap, String>> {
        match self.0.clone() {
            Some(map) => Box::pin(async move { Ok(map) }),
            None => Box::pin(std::future::pending()),
        }
    }

    fn update_features(
        &self,
        _project_id: &str,
        _patch: &FeaturePatch,
    ) -> LocalFuture<Result<ProjectFeaturesMap, String>> {
        Box::pin(async { Err("read-only".to_string()) })
    }
}

/// Signed-in resident of [`PROJECT`], with the query layer and navigation in context
pub fn provide_resident_session(api: FixedFeaturesApi) -> (FeatureQueryContext, AppGlobalContext) {
    let user = UserInfo {
        id: "u-1".into(),
        username: "resident".into(),
        full_name: None,
        role: UserRole::Resident,
        project_id: Some(PROJECT.into()),
    };
    let (auth_state, set_auth_state) = signal(AuthState {
        access_token: Some("token".into()),
        user_info: Some(user),
        active_project_id: None,
    });
    provide_context(auth_state);
    provide_context(set_auth_state);

    let app = AppGlobalContext::new();
    provide_context(app);

    (provide_feature_query(Arc::new(api)), app)
}

/// Run `body` under a fresh owner on a local task set, with effects enabled
pub async fn run_reactive<F, Fut>(body: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let _ = Executor::init_tokio();
    let owner = Owner::new();
    owner.set();
    tokio::task::LocalSet::new().run_until(body()).await;
}

/// Let pending effects and fetches run to completion
pub async fn settle() {
    for _ in 0..8 {
        Executor::tick().await;
        tokio::task::yield_now().await;
    }
}
