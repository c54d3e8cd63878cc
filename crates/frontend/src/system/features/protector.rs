//! Page-level feature protection.
//!
//! A protected page goes through `Loading` and then settles on one of
//! `Disabled`, `Redirect` or `Enabled`. The decision is recomputed from the
//! `(is_enabled, is_loading)` pair only; there are no timers or retries here.

use contracts::system::features::FeatureKey;
use leptos::prelude::*;
use serde::Serialize;
use thaw::*;

use super::hooks::use_feature_gate;
use super::query::FeatureAccess;
use crate::layout::global_context::{page_url, parse_query, AppGlobalContext, AppPage};

const FEATURE_DISABLED_ERROR: &str = "feature_disabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGateOptions {
    /// Navigate away instead of showing the disabled page
    pub redirect_on_disabled: bool,
    pub redirect_to: AppPage,
    /// Target of the disabled page's back button
    pub back_to: AppPage,
}

impl Default for PageGateOptions {
    fn default() -> Self {
        Self {
            redirect_on_disabled: false,
            redirect_to: AppPage::Dashboard,
            back_to: AppPage::Dashboard,
        }
    }
}

impl PageGateOptions {
    pub fn redirecting(to: AppPage) -> Self {
        Self {
            redirect_on_disabled: true,
            redirect_to: to,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageGate {
    Loading,
    Disabled { feature: FeatureKey, back_to: AppPage },
    Redirect { to: String },
    Enabled,
}

/// A gate decision applied to a page's inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome<P> {
    Loading,
    Disabled { feature: FeatureKey, back_to: AppPage },
    Redirect { to: String },
    Render(P),
}

impl PageGate {
    /// Only `Enabled` hands the props to the page, untouched
    pub fn with_props<P>(self, props: P) -> PageOutcome<P> {
        match self {
            PageGate::Loading => PageOutcome::Loading,
            PageGate::Disabled { feature, back_to } => PageOutcome::Disabled { feature, back_to },
            PageGate::Redirect { to } => PageOutcome::Redirect { to },
            PageGate::Enabled => PageOutcome::Render(props),
        }
    }
}

impl<P> PageOutcome<P> {
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> PageOutcome<Q> {
        match self {
            PageOutcome::Loading => PageOutcome::Loading,
            PageOutcome::Disabled { feature, back_to } => PageOutcome::Disabled { feature, back_to },
            PageOutcome::Redirect { to } => PageOutcome::Redirect { to },
            PageOutcome::Render(props) => PageOutcome::Render(f(props)),
        }
    }
}

pub fn decide_page(feature: FeatureKey, access: FeatureAccess, options: &PageGateOptions) -> PageGate {
    if access.is_loading {
        return PageGate::Loading;
    }
    if access.is_enabled {
        return PageGate::Enabled;
    }
    if options.redirect_on_disabled {
        PageGate::Redirect {
            to: feature_redirect_url(options.redirect_to, feature),
        }
    } else {
        PageGate::Disabled {
            feature,
            back_to: options.back_to,
        }
    }
}

#[derive(Serialize)]
struct FeatureRedirectQuery<'a> {
    page: &'a str,
    error: &'a str,
    feature: &'a str,
}

/// URL of `destination` carrying the feature that caused the redirect
pub fn feature_redirect_url(destination: AppPage, feature: FeatureKey) -> String {
    let query = FeatureRedirectQuery {
        page: destination.key(),
        error: FEATURE_DISABLED_ERROR,
        feature: feature.as_str(),
    };
    match serde_qs::to_string(&query) {
        Ok(qs) => format!("?{}", qs),
        Err(e) => {
            log::error!("Failed to build redirect query: {}", e);
            page_url(destination)
        }
    }
}

/// Feature named by a redirect notice in `search`, if any
pub fn read_redirect_notice(search: &str) -> Option<FeatureKey> {
    let params = parse_query(search);
    if params.get("error").map(String::as_str) != Some(FEATURE_DISABLED_ERROR) {
        return None;
    }
    params.get("feature")?.parse().ok()
}

#[component]
pub fn FeatureLoading() -> impl IntoView {
    view! {
        <div class="feature-loading">
            <Spinner />
        </div>
    }
}

#[component]
pub fn FeatureDisabledPage(feature: FeatureKey, #[prop(optional)] back_to: AppPage) -> impl IntoView {
    let app = use_context::<AppGlobalContext>();

    view! {
        <div class="feature-disabled">
            <div class="feature-disabled__icon">{feature.icon()}</div>
            <h2>{format!("{} is not available", feature.label())}</h2>
            <p>"This feature is turned off for your community. Contact your administrator if you need it."</p>
            <Button
                appearance=ButtonAppearance::Primary
                on_click=move |_| {
                    if let Some(app) = app {
                        app.navigate(back_to);
                    }
                }
            >
                "Go back"
            </Button>
        </div>
    }
}

/// Gate decision of a protected page.
///
/// A `Redirect` decision also navigates to the URL it carries.
pub fn use_page_gate(feature: FeatureKey, options: PageGateOptions) -> Memo<PageGate> {
    let access = use_feature_gate(feature);
    let gate = Memo::new(move |_| decide_page(feature, access.get(), &options));
    let app = use_context::<AppGlobalContext>();

    Effect::new(move |_| {
        if let PageGate::Redirect { to } = gate.get() {
            log::info!("Feature '{}' is disabled, redirecting to {}", feature, to);
            match app {
                Some(app) => app.navigate_to_url(&to),
                None => log::warn!("No navigation context, cannot redirect"),
            }
        }
    });

    gate
}

/// Current outcome of `page` behind `gate`; `page` only runs on `Enabled`
pub fn gated_page<P, F, V>(
    gate: Memo<PageGate>,
    props: P,
    page: F,
) -> impl Fn() -> PageOutcome<V> + Clone + Send + Sync + 'static
where
    P: Clone + Send + Sync + 'static,
    F: Fn(P) -> V + Clone + Send + Sync + 'static,
{
    move || gate.get().with_props(props.clone()).map(&page)
}

fn outcome_view<V, O>(outcome: O) -> AnyView
where
    V: IntoView + 'static,
    O: Fn() -> PageOutcome<V> + Send + Sync + 'static,
{
    (move || match outcome() {
        // The loading view also covers the redirect so the page never flashes
        PageOutcome::Loading | PageOutcome::Redirect { .. } => view! { <FeatureLoading/> }.into_any(),
        PageOutcome::Disabled { feature, back_to } => {
            view! { <FeatureDisabledPage feature=feature back_to=back_to/> }.into_any()
        }
        PageOutcome::Render(page) => page.into_any(),
    })
    .into_any()
}

/// Shows `children` only once `feature` is confirmed enabled
#[component]
pub fn FeatureProtectedPage(
    feature: FeatureKey,
    #[prop(optional)] options: PageGateOptions,
    children: ChildrenFn,
) -> impl IntoView {
    outcome_view(gated_page(use_page_gate(feature, options), (), move |()| children()))
}

/// Wrap a page constructor so that it only runs when `feature` is enabled.
///
/// The returned function takes the page's props and passes them through as-is.
pub fn with_feature_protection<P, F, V>(
    feature: FeatureKey,
    options: PageGateOptions,
    page: F,
) -> impl Fn(P) -> AnyView + Clone
where
    P: Clone + Send + Sync + 'static,
    F: Fn(P) -> V + Clone + Send + Sync + 'static,
    V: IntoView + 'static,
{
    move |props: P| {
        let gate = use_page_gate(feature, options.clone());
        outcome_view(gated_page(gate, props, page.clone()))
    }
}

/// Inline variant of page protection
#[derive(Clone)]
pub struct PageAccess {
    pub can_access: Signal<bool>,
    pub is_loading: Signal<bool>,
    pub render_disabled: ViewFn,
}

pub fn use_page_access(feature: FeatureKey, back_to: AppPage) -> PageAccess {
    let access = use_feature_gate(feature);

    PageAccess {
        can_access: Signal::derive(move || access.with(|a| a.is_enabled && !a.is_loading)),
        is_loading: Signal::derive(move || access.with(|a| a.is_loading)),
        render_disabled: ViewFn::from(move || view! { <FeatureDisabledPage feature=feature back_to=back_to/> }),
    }
}
