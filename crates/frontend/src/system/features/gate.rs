use contracts::system::features::FeatureKey;
use leptos::prelude::*;

use super::hooks::use_feature;

/// What a gate shows for a given feature state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateBranch {
    Children,
    Fallback,
    Nothing,
}

/// A feature that is still loading reads as disabled here
pub fn gate_branch(enabled: bool, has_fallback: bool) -> GateBranch {
    match (enabled, has_fallback) {
        (true, _) => GateBranch::Children,
        (false, true) => GateBranch::Fallback,
        (false, false) => GateBranch::Nothing,
    }
}

/// Reactive branch of a gate on `feature` for the current project
pub fn use_gate_branch(feature: FeatureKey, has_fallback: bool) -> Signal<GateBranch> {
    let enabled = use_feature(feature);
    Signal::derive(move || gate_branch(enabled.get(), has_fallback))
}

fn gated_view(feature: FeatureKey, fallback: Option<ViewFn>, content: ViewFn) -> AnyView {
    let branch = use_gate_branch(feature, fallback.is_some());

    (move || match branch.get() {
        GateBranch::Children => content.run(),
        GateBranch::Fallback => fallback
            .as_ref()
            .map(ViewFn::run)
            .unwrap_or_else(|| ().into_any()),
        GateBranch::Nothing => ().into_any(),
    })
    .into_any()
}

/// Renders `children` while `feature` is enabled for the current project,
/// otherwise `fallback` (nothing by default)
#[component]
pub fn FeatureGate(
    feature: FeatureKey,
    #[prop(optional, into)] fallback: Option<ViewFn>,
    children: ChildrenFn,
) -> impl IntoView {
    gated_view(feature, fallback, ViewFn::from(move || children()))
}

/// Wrap a whole component in the same decision as [`FeatureGate`].
///
/// ```ignore
/// let gated = with_feature_gate(FeatureKey::Parcels, None);
/// let card = gated(ViewFn::from(|| view! { <ParcelsCard/> }));
/// ```
pub fn with_feature_gate(
    feature: FeatureKey,
    fallback: Option<ViewFn>,
) -> impl Fn(ViewFn) -> ViewFn + Clone {
    move |component: ViewFn| {
        let fallback = fallback.clone();
        ViewFn::from(move || gated_view(feature, fallback.clone(), component.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::features::testing::{
        provide_resident_session, run_reactive, settle, FixedFeaturesApi,
    };
    use contracts::system::features::ProjectFeaturesMap;

    #[test]
    fn test_enabled_renders_children() {
        assert_eq!(gate_branch(true, false), GateBranch::Children);
        assert_eq!(gate_branch(true, true), GateBranch::Children);
    }

    #[test]
    fn test_disabled_renders_fallback_when_given() {
        assert_eq!(gate_branch(false, true), GateBranch::Fallback);
    }

    #[test]
    fn test_disabled_without_fallback_renders_nothing() {
        assert_eq!(gate_branch(false, false), GateBranch::Nothing);
    }

    #[tokio::test]
    async fn test_gate_hides_content_until_map_loads() {
        run_reactive(|| async {
            provide_resident_session(FixedFeaturesApi(None));
            let with_fallback = use_gate_branch(FeatureKey::Parcels, true);
            let bare = use_gate_branch(FeatureKey::Parcels, false);
            settle().await;

            assert_eq!(with_fallback.get_untracked(), GateBranch::Fallback);
            assert_eq!(bare.get_untracked(), GateBranch::Nothing);
        })
        .await;
    }

    #[tokio::test]
    async fn test_gate_follows_loaded_map() {
        run_reactive(|| async {
            provide_resident_session(FixedFeaturesApi(Some(
                ProjectFeaturesMap::new().with(FeatureKey::Sos, true),
            )));
            let sos = use_gate_branch(FeatureKey::Sos, true);
            let visitors = use_gate_branch(FeatureKey::Visitors, true);
            settle().await;

            assert_eq!(sos.get_untracked(), GateBranch::Children);
            assert_eq!(visitors.get_untracked(), GateBranch::Fallback);
        })
        .await;
    }
}
