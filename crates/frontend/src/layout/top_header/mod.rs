//! Top bar: brand, sidebar toggle, project switcher and the signed-in user.

mod project_switcher;

use crate::layout::global_context::use_app_context;
use crate::system::auth::context::{do_logout, use_auth};
use crate::system::features::hooks::use_feature_query;
use leptos::prelude::*;
use leptos::task::spawn_local;
use project_switcher::ProjectSwitcher;

#[component]
pub fn TopHeader() -> impl IntoView {
    let ctx = use_app_context();
    let (auth_state, set_auth_state) = use_auth();
    let features = use_feature_query().client;

    let is_super_admin = move || {
        auth_state.with(|s| {
            s.user_info
                .as_ref()
                .is_some_and(|u| u.role.is_super_admin())
        })
    };

    let logout = move |_| {
        let features = features.clone();
        spawn_local(async move {
            do_logout(set_auth_state).await;
            features.invalidate_all();
        });
    };

    view! {
        <div class="top-header">
            <div class="top-header__brand">
                <button
                    class="top-header__icon-btn"
                    on:click=move |_| ctx.toggle_left()
                    title=move || if ctx.left_open.get() { "Hide navigation" } else { "Show navigation" }
                >
                    "☰"
                </button>
                <span class="top-header__title">"My Village"</span>
            </div>

            <div class="top-header__actions">
                <Show when=is_super_admin>
                    <ProjectSwitcher />
                </Show>

                <div class="top-header__user">
                    <span>
                        {move || auth_state.with(|s| s.user_info
                            .as_ref()
                            .map(|u| u.full_name.clone().unwrap_or_else(|| u.username.clone()))
                            .unwrap_or_else(|| "Guest".to_string()))}
                    </span>
                    <span class="top-header__role">
                        {move || auth_state.with(|s| s.user_info
                            .as_ref()
                            .map(|u| u.role.as_str())
                            .unwrap_or_default())}
                    </span>
                </div>

                <button class="top-header__icon-btn" on:click=logout title="Sign out">
                    "⎋"
                </button>
            </div>
        </div>
    }
}
