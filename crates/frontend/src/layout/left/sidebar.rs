//! Navigation sidebar. Feature areas only show up when enabled for the project.

use crate::layout::global_context::{use_app_context, AppGlobalContext, AppPage};
use crate::system::auth::context::use_auth;
use crate::system::features::FeatureGate;
use contracts::system::features::FEATURE_KEYS;
use leptos::prelude::*;

#[component]
fn NavItem(page: AppPage, icon: &'static str, label: &'static str) -> impl IntoView {
    let ctx: AppGlobalContext = use_app_context();

    view! {
        <div
            class="app-sidebar__item"
            class:app-sidebar__item--active=move || ctx.page.get() == page
            on:click=move |_| ctx.navigate(page)
        >
            <div class="app-sidebar__item-content">
                <span class="app-sidebar__icon">{icon}</span>
                <span>{label}</span>
            </div>
        </div>
    }
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_app_context();
    let (auth_state, _) = use_auth();
    let is_admin = move || auth_state.with(|s| s.is_admin());

    view! {
        <div data-zone="left" class="app-sidebar" class:hidden=move || !ctx.left_open.get()>
            <div class="app-sidebar__content">
                <NavItem page=AppPage::Dashboard icon="🏠" label="Dashboard" />

                {FEATURE_KEYS
                    .iter()
                    .map(|feature| {
                        let feature = *feature;
                        view! {
                            <FeatureGate feature=feature>
                                <NavItem
                                    page=AppPage::Feature(feature)
                                    icon=feature.icon()
                                    label=feature.label()
                                />
                            </FeatureGate>
                        }
                    })
                    .collect_view()}

                <Show when=is_admin>
                    <div class="app-sidebar__group">"Administration"</div>
                    <NavItem page=AppPage::FeatureSettings icon="⚙️" label="Project features" />
                </Show>
            </div>
        </div>
    }
}
