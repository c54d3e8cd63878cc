use crate::app_shell::AppShell;
use crate::layout::global_context::AppGlobalContext;
use crate::system::auth::context::AuthProvider;
use crate::system::features::api::HttpFeaturesApi;
use crate::system::features::provide_feature_query;
use leptos::prelude::*;
use std::sync::Arc;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppGlobalContext::new());
    provide_feature_query(Arc::new(HttpFeaturesApi));

    view! {
        <AuthProvider>
            <AppShell />
        </AuthProvider>
    }
}
