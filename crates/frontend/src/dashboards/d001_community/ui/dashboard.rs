use crate::layout::global_context::{use_app_context, AppPage};
use crate::system::features::{read_redirect_notice, use_features, with_feature_gate, FeatureGate};
use contracts::system::features::{FeatureKey, FEATURE_KEYS};
use leptos::prelude::*;
use thaw::*;

#[component]
fn AreaCard(feature: FeatureKey, description: &'static str) -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <Card class="dashboard-card">
            <div class="dashboard-card__title">
                <span>{feature.icon()}</span>
                " "
                <span>{feature.label()}</span>
            </div>
            <p class="dashboard-card__text">{description}</p>
            <Button
                size=ButtonSize::Small
                appearance=ButtonAppearance::Secondary
                on_click=move |_| ctx.navigate(AppPage::Feature(feature))
            >
                "Open"
            </Button>
        </Card>
    }
}

/// Placeholder for an area the community has switched off
#[component]
fn UnavailableCard(feature: FeatureKey) -> impl IntoView {
    view! {
        <Card class="dashboard-card dashboard-card--muted">
            <div class="dashboard-card__title">
                <span>{feature.icon()}</span>
                " "
                <span>{feature.label()}</span>
            </div>
            <p class="dashboard-card__text">"Not available in your community."</p>
        </Card>
    }
}

fn describe(feature: FeatureKey) -> &'static str {
    match feature {
        FeatureKey::Maintenance => "Report and follow up on repairs in your home.",
        FeatureKey::Facilities => "Book the pool, gym and function rooms.",
        FeatureKey::Parcels => "Parcels waiting for you at the gate house.",
        FeatureKey::Transport => "Shuttle timetables and seat reservations.",
        FeatureKey::Sos => "Alert security in an emergency.",
        FeatureKey::Visitors => "Pre-register guests and delivery drivers.",
        FeatureKey::Support => "Questions and complaints for the management office.",
    }
}

/// Banner shown after a disabled page redirected here
#[component]
fn RedirectNotice() -> impl IntoView {
    let ctx = use_app_context();
    let notice = Memo::new(move |_| ctx.search.with(|s| read_redirect_notice(s)));

    move || {
        notice.get().map(|feature| {
            view! {
                <div class="notice notice--warning">
                    {format!(
                        "{} {} is not enabled for this community.",
                        feature.icon(),
                        feature.label()
                    )}
                </div>
            }
        })
    }
}

#[component]
pub fn CommunityDashboard() -> impl IntoView {
    let enabled = use_features(FEATURE_KEYS.to_vec());
    let enabled_count = move || enabled.with(|map| map.values().filter(|on| **on).count());

    // Emergency shortcut is always on top when available
    let sos_card = with_feature_gate(FeatureKey::Sos, None)(ViewFn::from(|| {
        view! {
            <div class="sos-banner">
                <AreaCard feature=FeatureKey::Sos description="Press and hold to call security." />
            </div>
        }
    }));

    view! {
        <div class="dashboard" style="padding: 20px;">
            <RedirectNotice />

            <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center style="margin-bottom: 16px;">
                <h2 style="margin: 0;">"Welcome home"</h2>
                <span class="dashboard__summary">
                    {move || format!("{} of {} services available", enabled_count(), FEATURE_KEYS.len())}
                </span>
            </Flex>

            {sos_card.run()}

            <div class="dashboard-grid">
                {FEATURE_KEYS
                    .iter()
                    .filter(|feature| **feature != FeatureKey::Sos)
                    .map(|feature| {
                        let feature = *feature;
                        view! {
                            <FeatureGate
                                feature=feature
                                fallback=move || view! { <UnavailableCard feature=feature/> }
                            >
                                <AreaCard feature=feature description=describe(feature) />
                            </FeatureGate>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
