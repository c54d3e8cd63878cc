//! Reactive bindings over [`FeatureQueryClient`].
//!
//! The client is provided once at the app root. Every hook reads through the
//! same cache, so any number of gates on one page cost a single request per
//! project.

use contracts::system::features::{FeatureKey, FeaturePatch};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::query::{
    feature_access, read_feature, read_features, FeatureAccess, FeatureQueryClient, FeaturesApi,
    FeaturesSnapshot, FEATURES_SCOPE,
};
use crate::system::auth::context::use_current_project_id;

#[derive(Clone)]
pub struct FeatureQueryContext {
    pub client: FeatureQueryClient,
    /// Bumped on every change to a feature-map entry
    pub version: RwSignal<u64>,
}

pub fn provide_feature_query(api: Arc<dyn FeaturesApi>) -> FeatureQueryContext {
    let client = FeatureQueryClient::new(api);
    let version = RwSignal::new(0u64);

    let subscription = client.cache().subscribe(Arc::new(move |key| {
        if key.scope() == FEATURES_SCOPE {
            version.try_update(|v| *v += 1);
        }
    }));

    let cache = client.cache().clone();
    on_cleanup(move || {
        cache.unsubscribe(subscription);
    });

    let ctx = FeatureQueryContext { client, version };
    provide_context(ctx.clone());
    ctx
}

pub fn use_feature_query() -> FeatureQueryContext {
    use_context::<FeatureQueryContext>()
        .expect("FeatureQueryContext not found in component tree")
}

/// Feature map of `project_id`, fetched on demand and kept in sync with the cache
pub fn use_project_features(project_id: Signal<Option<String>>) -> Signal<FeaturesSnapshot> {
    let FeatureQueryContext { client, version } = use_feature_query();

    let fetcher = client.clone();
    Effect::new(move |_| {
        version.track();
        let project = project_id.get();
        let fetcher = fetcher.clone();
        spawn_local(async move {
            fetcher.resolve(project.as_deref()).await;
        });
    });

    Signal::derive(move || {
        version.track();
        project_id.with(|project| client.snapshot(project.as_deref()))
    })
}

/// Features of the session's current project
pub fn use_current_features() -> Signal<FeaturesSnapshot> {
    use_project_features(use_current_project_id())
}

/// `true` only once the current project's map is loaded and has `key` enabled
pub fn use_feature(key: FeatureKey) -> Signal<bool> {
    let snapshot = use_current_features();
    Signal::derive(move || snapshot.with(|s| read_feature(s, key)))
}

/// Batch read; every key is present in the result
pub fn use_features(keys: Vec<FeatureKey>) -> Signal<BTreeMap<FeatureKey, bool>> {
    let snapshot = use_current_features();
    Signal::derive(move || snapshot.with(|s| read_features(s, &keys)))
}

pub fn use_feature_gate(key: FeatureKey) -> Signal<FeatureAccess> {
    let snapshot = use_current_features();
    Signal::derive(move || snapshot.with(|s| feature_access(s, key)))
}

/// Handle for saving feature changes of a project
#[derive(Clone)]
pub struct UpdateProjectFeatures {
    client: FeatureQueryClient,
    pub pending: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    /// Count of successful saves
    pub saved: RwSignal<u64>,
}

impl UpdateProjectFeatures {
    pub fn mutate(&self, project_id: String, patch: FeaturePatch) {
        let client = self.client.clone();
        let (pending, error, saved) = (self.pending, self.error, self.saved);

        pending.set(true);
        error.set(None);
        spawn_local(async move {
            match client.update(&project_id, patch).await {
                Ok(_) => saved.update(|n| *n += 1),
                Err(e) => error.set(Some(e)),
            }
            pending.set(false);
        });
    }
}

pub fn use_update_project_features() -> UpdateProjectFeatures {
    UpdateProjectFeatures {
        client: use_feature_query().client,
        pending: RwSignal::new(false),
        error: RwSignal::new(None),
        saved: RwSignal::new(0),
    }
}
