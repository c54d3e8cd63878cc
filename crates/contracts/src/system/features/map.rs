use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::registry::{FeatureKey, FEATURE_KEYS};

/// Enabled/disabled state of features for one project.
///
/// Reads are fail-closed: a key that is absent reads as disabled.
/// Decoding drops keys the registry does not know, so a newer backend
/// cannot inject unknown areas into an older client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<FeatureKey, bool>")]
pub struct ProjectFeaturesMap(BTreeMap<FeatureKey, bool>);

impl ProjectFeaturesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registry key set to `enabled`
    pub fn all(enabled: bool) -> Self {
        Self(FEATURE_KEYS.iter().map(|k| (*k, enabled)).collect())
    }

    pub fn get(&self, key: FeatureKey) -> Option<bool> {
        self.0.get(&key).copied()
    }

    pub fn is_enabled(&self, key: FeatureKey) -> bool {
        self.get(key).unwrap_or(false)
    }

    pub fn set(&mut self, key: FeatureKey, enabled: bool) {
        self.0.insert(key, enabled);
    }

    pub fn with(mut self, key: FeatureKey, enabled: bool) -> Self {
        self.set(key, enabled);
        self
    }

    /// Copy with an entry for every registry key; absent keys become `false`
    pub fn resolved(&self) -> Self {
        Self(
            FEATURE_KEYS
                .iter()
                .map(|k| (*k, self.is_enabled(*k)))
                .collect(),
        )
    }

    pub fn apply(&mut self, patch: &FeaturePatch) {
        for (key, enabled) in patch.iter() {
            self.set(key, enabled);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, bool)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, bool>> for ProjectFeaturesMap {
    fn from(raw: BTreeMap<String, bool>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(k, v)| k.parse::<FeatureKey>().ok().map(|key| (key, v)))
                .collect(),
        )
    }
}

impl From<ProjectFeaturesMap> for BTreeMap<FeatureKey, bool> {
    fn from(map: ProjectFeaturesMap) -> Self {
        map.0
    }
}

impl FromIterator<(FeatureKey, bool)> for ProjectFeaturesMap {
    fn from_iter<I: IntoIterator<Item = (FeatureKey, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Partial update of a project's feature map.
///
/// Unlike [`ProjectFeaturesMap`], decoding is strict: an unknown key fails
/// the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeaturePatch(BTreeMap<FeatureKey, bool>);

impl FeaturePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(key: FeatureKey, enabled: bool) -> Self {
        Self::new().with(key, enabled)
    }

    pub fn with(mut self, key: FeatureKey, enabled: bool) -> Self {
        self.0.insert(key, enabled);
        self
    }

    /// Only the entries of `desired` that differ from `current`
    pub fn diff(current: &ProjectFeaturesMap, desired: &ProjectFeaturesMap) -> Self {
        Self(
            desired
                .iter()
                .filter(|(k, v)| current.get(*k) != Some(*v))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, bool)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of `GET`/`PATCH /api/projects/:id/features`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFeaturesResponse {
    pub project_id: String,
    pub features: ProjectFeaturesMap,
    pub updated_at: Option<String>,
}
