use crate::system::features::{FeatureProtectedPage, PageGateOptions};
use contracts::system::features::FeatureKey;
use leptos::prelude::*;

const DEPARTURES: [(&str, &str); 3] = [
    ("07:15", "Main gate → BTS station"),
    ("12:00", "Main gate → Shopping mall"),
    ("17:45", "BTS station → Main gate"),
];

#[component]
pub fn TransportPage() -> impl IntoView {
    view! {
        <FeatureProtectedPage feature=FeatureKey::Transport options=PageGateOptions::default()>
            <div class="feature-page" style="padding: 20px;">
                <h2>{format!("{} {}", FeatureKey::Transport.icon(), FeatureKey::Transport.label())}</h2>
                <table class="timetable">
                    <tbody>
                        {DEPARTURES
                            .iter()
                            .map(|(time, route)| view! { <tr><td>{*time}</td><td>{*route}</td></tr> })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        </FeatureProtectedPage>
    }
}
