use crate::system::features::FeatureProtectedPage;
use contracts::system::features::FeatureKey;
use leptos::prelude::*;

const FACILITIES: [(&str, &str); 4] = [
    ("Swimming pool", "06:00 - 21:00"),
    ("Fitness room", "05:00 - 23:00"),
    ("Club house", "09:00 - 22:00"),
    ("Tennis court", "07:00 - 20:00"),
];

#[component]
pub fn FacilitiesPage() -> impl IntoView {
    view! {
        <FeatureProtectedPage feature=FeatureKey::Facilities>
            <div class="feature-page" style="padding: 20px;">
                <h2>{format!("{} {}", FeatureKey::Facilities.icon(), FeatureKey::Facilities.label())}</h2>
                <ul class="facility-list">
                    {FACILITIES
                        .iter()
                        .map(|(name, hours)| view! { <li><strong>{*name}</strong>" · "{*hours}</li> })
                        .collect_view()}
                </ul>
            </div>
        </FeatureProtectedPage>
    }
}
