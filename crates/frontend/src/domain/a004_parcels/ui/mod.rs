use crate::system::features::{with_feature_protection, PageGateOptions};
use contracts::system::features::FeatureKey;
use leptos::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParcelsProps {
    pub show_collected: bool,
}

#[component]
fn ParcelsList(show_collected: bool) -> impl IntoView {
    view! {
        <div class="feature-page" style="padding: 20px;">
            <h2>{format!("{} {}", FeatureKey::Parcels.icon(), FeatureKey::Parcels.label())}</h2>
            <p>
                {if show_collected {
                    "No collected parcels yet."
                } else {
                    "Nothing waiting at the gate house."
                }}
            </p>
        </div>
    }
}

pub fn page() -> AnyView {
    with_feature_protection(
        FeatureKey::Parcels,
        PageGateOptions::default(),
        |props: ParcelsProps| view! { <ParcelsList show_collected=props.show_collected/> },
    )(ParcelsProps::default())
}
