//! Feature area pages. Each one is protected by its feature toggle.

pub mod a002_maintenance;
pub mod a003_facilities;
pub mod a004_parcels;
pub mod a005_transport;
pub mod a006_sos;
pub mod a007_visitors;
pub mod a008_support;

use contracts::system::features::FeatureKey;
use leptos::prelude::*;

pub fn feature_area_view(feature: FeatureKey) -> AnyView {
    match feature {
        FeatureKey::Maintenance => a002_maintenance::ui::page(),
        FeatureKey::Facilities => view! { <a003_facilities::ui::FacilitiesPage/> }.into_any(),
        FeatureKey::Parcels => a004_parcels::ui::page(),
        FeatureKey::Transport => view! { <a005_transport::ui::TransportPage/> }.into_any(),
        FeatureKey::Sos => a006_sos::ui::page(),
        FeatureKey::Visitors => view! { <a007_visitors::ui::VisitorsPage/> }.into_any(),
        FeatureKey::Support => view! { <a008_support::ui::SupportPage/> }.into_any(),
    }
}
