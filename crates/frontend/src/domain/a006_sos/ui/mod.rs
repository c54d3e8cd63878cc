use crate::layout::global_context::AppPage;
use crate::system::features::{with_feature_protection, PageGateOptions};
use contracts::system::features::FeatureKey;
use leptos::prelude::*;
use thaw::*;

#[component]
fn SosPanel() -> impl IntoView {
    let (sent, set_sent) = signal(false);

    view! {
        <div class="feature-page sos-page" style="padding: 20px;">
            <h2>{format!("{} {}", FeatureKey::Sos.icon(), FeatureKey::Sos.label())}</h2>
            <p>"Security will be notified of your location."</p>
            <Button
                appearance=ButtonAppearance::Primary
                disabled=sent
                on_click=move |_| {
                    log::info!("SOS alert raised");
                    set_sent.set(true);
                }
            >
                {move || if sent.get() { "Security notified" } else { "Send SOS" }}
            </Button>
        </div>
    }
}

/// A disabled SOS page sends the user back to the dashboard with a notice
pub fn page() -> AnyView {
    with_feature_protection(
        FeatureKey::Sos,
        PageGateOptions::redirecting(AppPage::Dashboard),
        |_: ()| view! { <SosPanel/> },
    )(())
}
