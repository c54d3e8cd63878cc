use leptos::prelude::*;

use super::context::use_auth;

/// Renders children only for a signed-in user
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || auth_state.with(|s| s.is_authenticated())
            fallback=|| view! { <div>"Not authenticated. Please login."</div> }
        >
            {children()}
        </Show>
    }
}

/// Renders children only for project admins and super-admins
#[component]
pub fn RequireAdmin(children: ChildrenFn) -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || auth_state.with(|s| s.is_authenticated() && s.is_admin())
            fallback=|| view! { <div class="access-denied">"Access denied. Admin privileges required."</div> }
        >
            {children()}
        </Show>
    }
}
