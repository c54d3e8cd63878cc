//! Root components: the auth gate and the main layout.

use crate::dashboards::CommunityDashboard;
use crate::domain::feature_area_view;
use crate::layout::global_context::{use_app_context, AppPage};
use crate::layout::left::Sidebar;
use crate::layout::Shell;
use crate::system::auth::context::use_auth;
use crate::system::features::ui::settings::ProjectFeaturesSettings;
use crate::system::pages::login::LoginPage;
use leptos::prelude::*;

fn page_view(page: AppPage) -> AnyView {
    match page {
        AppPage::Dashboard => view! { <CommunityDashboard /> }.into_any(),
        AppPage::Feature(feature) => feature_area_view(feature),
        AppPage::FeatureSettings => view! { <ProjectFeaturesSettings /> }.into_any(),
    }
}

/// Sidebar plus the page selected by `?page=...`
#[component]
fn MainLayout() -> impl IntoView {
    let ctx = use_app_context();
    ctx.init_from_location();

    view! {
        <Shell
            left=|| view! { <Sidebar /> }.into_any()
            center=move || (move || page_view(ctx.page.get())).into_any()
        />
    }
}

/// Shows the login page until a session exists
#[component]
pub fn AppShell() -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || auth_state.with(|s| s.is_authenticated())
            fallback=|| view! { <LoginPage /> }
        >
            <MainLayout />
        </Show>
    }
}
