//! Per-project feature toggles on the client side.
//!
//! `query` owns caching and the fail-closed read rules, `hooks` exposes them
//! reactively, and `gate`/`protector` turn flags into rendered output.

pub mod api;
pub mod gate;
pub mod hooks;
pub mod protector;
pub mod query;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use gate::{with_feature_gate, FeatureGate};
pub use hooks::{
    provide_feature_query, use_feature, use_feature_gate, use_features, use_project_features,
    use_update_project_features,
};
pub use protector::{
    read_redirect_notice, use_page_access, with_feature_protection, FeatureProtectedPage,
    PageGateOptions,
};
