use crate::system::features::FeatureProtectedPage;
use contracts::system::features::FeatureKey;
use leptos::prelude::*;

#[component]
pub fn SupportPage() -> impl IntoView {
    view! {
        <FeatureProtectedPage feature=FeatureKey::Support>
            <div class="feature-page" style="padding: 20px;">
                <h2>{format!("{} {}", FeatureKey::Support.icon(), FeatureKey::Support.label())}</h2>
                <p>"You have no open tickets."</p>
            </div>
        </FeatureProtectedPage>
    }
}
