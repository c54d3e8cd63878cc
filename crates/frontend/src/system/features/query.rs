use contracts::system::features::{FeatureKey, FeaturePatch, ProjectFeaturesMap};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::shared::query::{FetchDecision, QueryCache, QueryKey, QueryStatus};

/// Scope tag of feature-map cache entries
pub const FEATURES_SCOPE: &str = "project-features";

pub type LocalFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Backend collaborator that stores feature maps
pub trait FeaturesApi: Send + Sync {
    fn fetch_features(&self, project_id: &str) -> LocalFuture<Result<ProjectFeaturesMap, String>>;

    fn update_features(
        &self,
        project_id: &str,
        patch: &FeaturePatch,
    ) -> LocalFuture<Result<ProjectFeaturesMap, String>>;
}

pub fn features_key(project_id: &str) -> QueryKey {
    QueryKey::for_project(FEATURES_SCOPE, project_id)
}

pub fn all_features_key() -> QueryKey {
    QueryKey::all(FEATURES_SCOPE)
}

/// What a consumer sees of one project's feature map at a point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturesSnapshot {
    pub data: Option<ProjectFeaturesMap>,
    /// No usable data yet and a fetch is pending
    pub is_loading: bool,
    /// A fetch (first or background) is running
    pub is_fetching: bool,
    pub error: Option<String>,
}

/// Resolved state of one feature for page-level protection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureAccess {
    pub is_enabled: bool,
    pub is_loading: bool,
}

/// Fail-closed read: not loaded, unresolvable project and absent key all read `false`
pub fn read_feature(snapshot: &FeaturesSnapshot, key: FeatureKey) -> bool {
    snapshot
        .data
        .as_ref()
        .map_or(false, |map| map.is_enabled(key))
}

pub fn read_features(snapshot: &FeaturesSnapshot, keys: &[FeatureKey]) -> BTreeMap<FeatureKey, bool> {
    keys.iter()
        .map(|key| (*key, read_feature(snapshot, *key)))
        .collect()
}

pub fn feature_access(snapshot: &FeaturesSnapshot, key: FeatureKey) -> FeatureAccess {
    FeatureAccess {
        is_enabled: read_feature(snapshot, key),
        is_loading: snapshot.is_loading,
    }
}

fn resolvable(project_id: Option<&str>) -> Option<&str> {
    project_id.filter(|id| !id.trim().is_empty())
}

/// Resolves, caches and mutates feature maps, one cache entry per project
#[derive(Clone)]
pub struct FeatureQueryClient {
    cache: QueryCache<ProjectFeaturesMap>,
    api: Arc<dyn FeaturesApi>,
}

impl FeatureQueryClient {
    pub fn new(api: Arc<dyn FeaturesApi>) -> Self {
        Self {
            cache: QueryCache::new(),
            api,
        }
    }

    pub fn cache(&self) -> &QueryCache<ProjectFeaturesMap> {
        &self.cache
    }

    /// Current cached view, without fetching.
    ///
    /// A known project with no entry yet reports loading: the fetch for it is
    /// about to start.
    pub fn snapshot(&self, project_id: Option<&str>) -> FeaturesSnapshot {
        let Some(project_id) = resolvable(project_id) else {
            return FeaturesSnapshot::default();
        };

        match self.cache.entry(&features_key(project_id)) {
            None => FeaturesSnapshot {
                is_loading: true,
                ..FeaturesSnapshot::default()
            },
            Some(entry) => match entry.status {
                QueryStatus::Loading => FeaturesSnapshot {
                    data: None,
                    is_loading: true,
                    is_fetching: entry.is_fetching,
                    error: None,
                },
                QueryStatus::Success => FeaturesSnapshot {
                    data: entry.value,
                    is_loading: false,
                    is_fetching: entry.is_fetching,
                    error: None,
                },
                // Errored maps are never trusted, even if an older value exists
                QueryStatus::Error(message) => FeaturesSnapshot {
                    data: None,
                    is_loading: false,
                    is_fetching: entry.is_fetching,
                    error: Some(message),
                },
            },
        }
    }

    /// Fetch the project's map unless a current or in-flight result exists.
    ///
    /// Without a project nothing is fetched and the default snapshot is returned.
    pub async fn resolve(&self, project_id: Option<&str>) -> FeaturesSnapshot {
        let Some(id) = resolvable(project_id) else {
            return FeaturesSnapshot::default();
        };

        match self.cache.begin_fetch(&features_key(id)) {
            Ok(FetchDecision::Start(ticket)) => {
                log::debug!("Fetching features for project {}", id);
                let result = self.api.fetch_features(id).await;
                if let Err(e) = &result {
                    log::warn!("Failed to load features for project {}: {}", id, e);
                }
                self.cache.settle(ticket, result);
            }
            Ok(FetchDecision::InFlight) | Ok(FetchDecision::Settled) => {}
            Err(e) => log::error!("{}", e),
        }

        self.snapshot(Some(id))
    }

    pub fn feature_gate(&self, project_id: Option<&str>, key: FeatureKey) -> FeatureAccess {
        feature_access(&self.snapshot(project_id), key)
    }

    /// Apply a partial update; on success the project's entry is invalidated.
    ///
    /// Failures leave the cache untouched and are not retried.
    pub async fn update(
        &self,
        project_id: &str,
        patch: FeaturePatch,
    ) -> Result<ProjectFeaturesMap, String> {
        let Some(id) = resolvable(Some(project_id)) else {
            return Err("No project selected".to_string());
        };
        if patch.is_empty() {
            return Err("Nothing to update".to_string());
        }

        match self.api.update_features(id, &patch).await {
            Ok(map) => {
                let invalidated = self.cache.invalidate(&features_key(id));
                log::info!(
                    "Updated {} feature(s) of project {} ({} cache entr{} invalidated)",
                    patch.len(),
                    id,
                    invalidated,
                    if invalidated == 1 { "y" } else { "ies" }
                );
                Ok(map)
            }
            Err(e) => {
                log::warn!("Feature update for project {} failed: {}", id, e);
                Err(e)
            }
        }
    }

    /// Drop every cached feature map, e.g. after logout
    pub fn invalidate_all(&self) -> usize {
        self.cache.invalidate(&all_features_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::features::FEATURE_KEYS;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        maps: Mutex<HashMap<String, ProjectFeaturesMap>>,
        fetches: AtomicUsize,
        fail_fetch: AtomicBool,
        fail_update: AtomicBool,
    }

    impl FakeApi {
        fn with_project(project_id: &str, map: ProjectFeaturesMap) -> Arc<Self> {
            let api = Self::default();
            api.maps.lock().unwrap().insert(project_id.to_string(), map);
            Arc::new(api)
        }

        fn add_project(&self, project_id: &str, map: ProjectFeaturesMap) {
            self.maps.lock().unwrap().insert(project_id.to_string(), map);
        }
    }

    impl FeaturesApi for FakeApi {
        fn fetch_features(
            &self,
            project_id: &str,
        ) -> LocalFuture<Result<ProjectFeaturesMap, String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let result = if self.fail_fetch.load(Ordering::SeqCst) {
                Err("503".to_string())
            } else {
                self.maps
                    .lock()
                    .unwrap()
                    .get(project_id)
                    .cloned()
                    .ok_or_else(|| "404".to_string())
            };
            Box::pin(async move { result })
        }

        fn update_features(
            &self,
            project_id: &str,
            patch: &FeaturePatch,
        ) -> LocalFuture<Result<ProjectFeaturesMap, String>> {
            let result = if self.fail_update.load(Ordering::SeqCst) {
                Err("500".to_string())
            } else {
                let mut maps = self.maps.lock().unwrap();
                let map = maps.entry(project_id.to_string()).or_default();
                map.apply(patch);
                Ok(map.clone())
            };
            Box::pin(async move { result })
        }
    }

    fn client(api: &Arc<FakeApi>) -> FeatureQueryClient {
        FeatureQueryClient::new(Arc::clone(api) as Arc<dyn FeaturesApi>)
    }

    #[tokio::test]
    async fn test_no_project_means_not_loading_and_no_fetch() {
        let api = Arc::new(FakeApi::default());
        let client = client(&api);

        for project in [None, Some(""), Some("  ")] {
            let snapshot = client.resolve(project).await;
            assert_eq!(snapshot, FeaturesSnapshot::default());
            assert!(!read_feature(&snapshot, FeatureKey::Maintenance));
        }
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unloaded_map_reads_disabled_while_loading() {
        let api = FakeApi::with_project("p-1", ProjectFeaturesMap::all(true));
        let client = client(&api);

        let before = client.snapshot(Some("p-1"));
        assert!(before.is_loading);
        assert!(!read_feature(&before, FeatureKey::Maintenance));

        let after = client.resolve(Some("p-1")).await;
        assert!(!after.is_loading);
        assert!(read_feature(&after, FeatureKey::Maintenance));
    }

    #[tokio::test]
    async fn test_absent_key_in_loaded_map_reads_disabled() {
        let api = FakeApi::with_project(
            "p-1",
            ProjectFeaturesMap::new().with(FeatureKey::Maintenance, true),
        );
        let snapshot = client(&api).resolve(Some("p-1")).await;
        assert!(read_feature(&snapshot, FeatureKey::Maintenance));
        assert!(!read_feature(&snapshot, FeatureKey::Visitors));
    }

    #[tokio::test]
    async fn test_batch_read_matches_single_reads() {
        let api = FakeApi::with_project(
            "p-1",
            ProjectFeaturesMap::new()
                .with(FeatureKey::Maintenance, true)
                .with(FeatureKey::Sos, false),
        );
        let snapshot = client(&api).resolve(Some("p-1")).await;

        let keys = [FeatureKey::Sos, FeatureKey::Maintenance, FeatureKey::Parcels];
        let batch = read_features(&snapshot, &keys);
        assert_eq!(batch.len(), 3);
        for key in keys {
            assert_eq!(batch[&key], read_feature(&snapshot, key));
        }

        let mut reversed = keys;
        reversed.reverse();
        assert_eq!(read_features(&snapshot, &reversed), batch);
    }

    #[tokio::test]
    async fn test_cached_map_is_fetched_once() {
        let api = FakeApi::with_project("p-1", ProjectFeaturesMap::all(true));
        let client = client(&api);

        client.resolve(Some("p-1")).await;
        client.resolve(Some("p-1")).await;
        client.clone().resolve(Some("p-1")).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_and_next_read_sees_new_value() {
        let api = FakeApi::with_project(
            "p-1",
            ProjectFeaturesMap::new().with(FeatureKey::Maintenance, true),
        );
        let client = client(&api);

        let snapshot = client.resolve(Some("p-1")).await;
        assert!(read_feature(&snapshot, FeatureKey::Maintenance));

        client
            .update("p-1", FeaturePatch::single(FeatureKey::Maintenance, false))
            .await
            .unwrap();

        // stale value until the refetch settles
        assert!(read_feature(&client.snapshot(Some("p-1")), FeatureKey::Maintenance));

        let snapshot = client.resolve(Some("p-1")).await;
        assert!(!read_feature(&snapshot, FeatureKey::Maintenance));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_cache() {
        let api = FakeApi::with_project("p-1", ProjectFeaturesMap::all(true));
        let client = client(&api);
        client.resolve(Some("p-1")).await;

        api.fail_update.store(true, Ordering::SeqCst);
        let result = client
            .update("p-1", FeaturePatch::single(FeatureKey::Sos, false))
            .await;
        assert_eq!(result, Err("500".to_string()));

        let entry = client.cache().entry(&features_key("p-1")).unwrap();
        assert!(!entry.stale);
        client.resolve(Some("p-1")).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_of_one_project_keeps_other_cached() {
        let api = FakeApi::with_project("a", ProjectFeaturesMap::all(true));
        api.add_project("b", ProjectFeaturesMap::all(true));
        let client = client(&api);

        client.resolve(Some("a")).await;
        client.resolve(Some("b")).await;
        client
            .update("b", FeaturePatch::single(FeatureKey::Parcels, false))
            .await
            .unwrap();

        assert!(!client.cache().entry(&features_key("a")).unwrap().stale);
        assert!(client.cache().entry(&features_key("b")).unwrap().stale);
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_closed() {
        let api = FakeApi::with_project("p-1", ProjectFeaturesMap::all(true));
        api.fail_fetch.store(true, Ordering::SeqCst);
        let client = client(&api);

        let snapshot = client.resolve(Some("p-1")).await;
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error.as_deref(), Some("503"));
        for key in FEATURE_KEYS {
            assert!(!read_feature(&snapshot, key));
        }
        assert_eq!(
            client.feature_gate(Some("p-1"), FeatureKey::Sos),
            FeatureAccess {
                is_enabled: false,
                is_loading: false
            }
        );
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected_without_calling_backend() {
        let api = FakeApi::with_project("p-1", ProjectFeaturesMap::all(true));
        let client = client(&api);
        assert!(client.update("p-1", FeaturePatch::new()).await.is_err());
        assert!(client
            .update("", FeaturePatch::single(FeatureKey::Sos, true))
            .await
            .is_err());
    }
}
