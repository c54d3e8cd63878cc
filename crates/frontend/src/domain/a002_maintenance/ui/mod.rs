use crate::system::features::{with_feature_protection, PageGateOptions};
use contracts::system::features::FeatureKey;
use leptos::prelude::*;
use thaw::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl RequestStatus {
    fn label(self) -> &'static str {
        match self {
            RequestStatus::Open => "Open",
            RequestStatus::InProgress => "In progress",
            RequestStatus::Done => "Done",
        }
    }
}

#[component]
pub fn MaintenanceRequests(status: RequestStatus) -> impl IntoView {
    let status = RwSignal::new(status);

    view! {
        <div class="feature-page" style="padding: 20px;">
            <h2>{format!("{} {}", FeatureKey::Maintenance.icon(), FeatureKey::Maintenance.label())}</h2>
            <Flex gap=FlexGap::Small style="margin-bottom: 16px;">
                {[RequestStatus::Open, RequestStatus::InProgress, RequestStatus::Done]
                    .into_iter()
                    .map(|s| view! {
                        <Button
                            size=ButtonSize::Small
                            appearance=Signal::derive(move || if status.get() == s {
                                ButtonAppearance::Primary
                            } else {
                                ButtonAppearance::Subtle
                            })
                            on_click=move |_| status.set(s)
                        >
                            {s.label()}
                        </Button>
                    })
                    .collect_view()}
            </Flex>
            <p>{move || format!("No {} requests.", status.get().label().to_lowercase())}</p>
        </div>
    }
}

pub fn page() -> AnyView {
    let protected = with_feature_protection(
        FeatureKey::Maintenance,
        PageGateOptions::default(),
        |status: RequestStatus| view! { <MaintenanceRequests status=status/> },
    );
    protected(RequestStatus::default())
}
