//! Per-project feature toggles.
//!
//! The registry is the closed set of togglable areas; the map is the
//! enabled/disabled state of those areas for one project.

pub mod map;
pub mod registry;

pub use map::{FeaturePatch, ProjectFeaturesMap, ProjectFeaturesResponse};
pub use registry::{FeatureKey, UnknownFeatureKey, FEATURE_ICONS, FEATURE_KEYS, FEATURE_LABELS};
