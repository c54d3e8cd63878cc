use contracts::system::features::{FeatureKey, FeaturePatch, ProjectFeaturesMap, FEATURE_KEYS};
use leptos::prelude::*;
use thaw::*;

use crate::system::auth::context::use_current_project_id;
use crate::system::auth::guard::RequireAdmin;
use crate::system::features::hooks::{use_project_features, use_update_project_features};
use crate::system::features::query::FeaturesSnapshot;

/// Map described by the switch positions
fn desired_map(switches: &[(FeatureKey, RwSignal<bool>)]) -> ProjectFeaturesMap {
    switches
        .iter()
        .map(|(key, checked)| (*key, checked.get_untracked()))
        .collect()
}

/// Stored map the switches should move to, if it is settled and differs from `last`.
///
/// While a refetch runs the snapshot still holds the pre-save map.
fn map_to_sync(
    snapshot: &FeaturesSnapshot,
    last: Option<&ProjectFeaturesMap>,
) -> Option<ProjectFeaturesMap> {
    if snapshot.is_fetching {
        return None;
    }
    let map = snapshot.data.as_ref()?;
    (Some(map) != last).then(|| map.clone())
}

/// Admin page: toggle the features of the current project
#[component]
pub fn ProjectFeaturesSettings() -> impl IntoView {
    let project_id = use_current_project_id();
    let snapshot = use_project_features(project_id);
    let update = use_update_project_features();

    let switches: Vec<(FeatureKey, RwSignal<bool>)> = FEATURE_KEYS
        .iter()
        .map(|key| (*key, RwSignal::new(false)))
        .collect();

    // Follow the stored map whenever a different one lands
    let synced = switches.clone();
    Effect::new(move |last: Option<Option<ProjectFeaturesMap>>| {
        let last = last.flatten();
        match snapshot.with(|s| map_to_sync(s, last.as_ref())) {
            Some(map) => {
                for (key, checked) in &synced {
                    checked.set(map.is_enabled(*key));
                }
                Some(map)
            }
            None => last,
        }
    });

    let pending = update.pending;
    let error = update.error;
    let saved = update.saved;

    let to_save = switches.clone();
    let on_save = move |_| {
        let Some(project) = project_id.get_untracked() else {
            error.set(Some("Select a project first".to_string()));
            return;
        };
        let current = snapshot
            .with_untracked(|s| s.data.clone())
            .unwrap_or_default()
            .resolved();
        let patch = FeaturePatch::diff(&current, &desired_map(&to_save));
        if patch.is_empty() {
            log::debug!("No feature changes to save");
            return;
        }
        update.mutate(project, patch);
    };

    view! {
        <RequireAdmin>
            <div class="feature-settings" style="padding: 20px;">
                <Flex clone:on_save justify=FlexJustify::SpaceBetween align=FlexAlign::Center style="margin-bottom: 16px;">
                    <h2 style="margin: 0;">"⚙️ Project features"</h2>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=on_save
                        disabled=Signal::derive(move || pending.get() || project_id.with(Option::is_none))
                    >
                        {move || if pending.get() { "Saving..." } else { "Save" }}
                    </Button>
                </Flex>

                {move || error.get().map(|err| view! {
                    <div class="error-message">{err}</div>
                })}
                {move || (saved.get() > 0 && error.get().is_none()).then(|| view! {
                    <div class="success-message">"Saved"</div>
                })}

                {move || {
                    let s = snapshot.get();
                    if project_id.with(Option::is_none) {
                        view! { <p>"Pick a project in the header to manage its features."</p> }.into_any()
                    } else if s.is_loading {
                        view! {
                            <Flex justify=FlexJustify::Center gap=FlexGap::Small>
                                <Spinner />
                                "Loading..."
                            </Flex>
                        }.into_any()
                    } else if let Some(err) = s.error {
                        view! { <div class="error-message">{format!("Failed to load features: {}", err)}</div> }.into_any()
                    } else {
                        ().into_any()
                    }
                }}

                <Flex clone:switches vertical=true gap=FlexGap::Medium>
                    {switches
                        .iter()
                        .map(|(key, checked)| {
                            let label = format!("{} {}", key.icon(), key.label());
                            view! { <Switch checked=*checked label=label /> }
                        })
                        .collect_view()}
                </Flex>
            </div>
        </RequireAdmin>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_map_covers_every_switch() {
        let owner = Owner::new();
        owner.with(|| {
            let switches: Vec<_> = FEATURE_KEYS
                .iter()
                .map(|key| (*key, RwSignal::new(*key == FeatureKey::Sos)))
                .collect();
            let map = desired_map(&switches);
            assert_eq!(map.len(), FEATURE_KEYS.len());
            assert!(map.is_enabled(FeatureKey::Sos));
            assert!(!map.is_enabled(FeatureKey::Parcels));
        });
    }

    fn loaded(map: ProjectFeaturesMap, is_fetching: bool) -> FeaturesSnapshot {
        FeaturesSnapshot {
            data: Some(map),
            is_fetching,
            ..FeaturesSnapshot::default()
        }
    }

    #[test]
    fn test_switches_sync_to_first_loaded_map() {
        let map = ProjectFeaturesMap::all(true);
        assert_eq!(map_to_sync(&loaded(map.clone(), false), None), Some(map));
        assert_eq!(map_to_sync(&FeaturesSnapshot::default(), None), None);
    }

    #[test]
    fn test_switches_hold_position_during_refetch() {
        let before = ProjectFeaturesMap::all(true);
        let after = before.clone().with(FeatureKey::Parcels, false);

        // saved: entry invalidated, refetch running, old map still cached
        assert_eq!(map_to_sync(&loaded(before.clone(), true), Some(&before)), None);
        // refetch landed with the saved map
        assert_eq!(
            map_to_sync(&loaded(after.clone(), false), Some(&before)),
            Some(after.clone())
        );
        // same map again: leave unsaved edits alone
        assert_eq!(map_to_sync(&loaded(after.clone(), false), Some(&after)), None);
    }
}
