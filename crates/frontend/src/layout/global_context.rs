use contracts::system::features::FeatureKey;
use leptos::prelude::*;
use std::collections::HashMap;
#[cfg(target_arch = "wasm32")]
use web_sys::window;

const SETTINGS_FEATURES_KEY: &str = "settings-features";
const DASHBOARD_KEY: &str = "dashboard";

/// Top-level pages reachable through `?page=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPage {
    #[default]
    Dashboard,
    Feature(FeatureKey),
    FeatureSettings,
}

impl AppPage {
    pub fn key(&self) -> &'static str {
        match self {
            AppPage::Dashboard => DASHBOARD_KEY,
            AppPage::Feature(feature) => feature.as_str(),
            AppPage::FeatureSettings => SETTINGS_FEATURES_KEY,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            DASHBOARD_KEY => Some(AppPage::Dashboard),
            SETTINGS_FEATURES_KEY => Some(AppPage::FeatureSettings),
            other => other.parse::<FeatureKey>().ok().map(AppPage::Feature),
        }
    }
}

/// Parse a location search string (with or without the leading `?`)
pub fn parse_query(search: &str) -> HashMap<String, String> {
    serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default()
}

/// Page named by a search string; unknown or missing pages fall back to the dashboard
pub fn page_from_query(search: &str) -> AppPage {
    parse_query(search)
        .get("page")
        .and_then(|key| AppPage::from_key(key))
        .unwrap_or_default()
}

pub fn page_url(page: AppPage) -> String {
    let query = serde_qs::to_string(&HashMap::from([("page", page.key())])).unwrap_or_default();
    format!("?{}", query)
}

#[derive(Clone, Copy)]
pub struct AppGlobalContext {
    pub page: RwSignal<AppPage>,
    /// Search string of the current URL, including one-shot notices
    pub search: RwSignal<String>,
    pub left_open: RwSignal<bool>,
}

impl AppGlobalContext {
    pub fn new() -> Self {
        Self {
            page: RwSignal::new(AppPage::default()),
            search: RwSignal::new(String::new()),
            left_open: RwSignal::new(true),
        }
    }

    /// Pick up the page from the address bar on startup
    pub fn init_from_location(&self) {
        let search = current_search();
        self.page.set(page_from_query(&search));
        self.search.set(search);
    }

    pub fn navigate(&self, page: AppPage) {
        self.navigate_to_url(&page_url(page));
    }

    /// Navigate to a `?page=...` URL, keeping any extra parameters readable via `search`
    pub fn navigate_to_url(&self, url: &str) {
        let page = page_from_query(url);
        log::debug!("navigate: {} -> {:?}", url, page);

        if current_search() != url {
            push_history(url);
        }

        self.search.set(url.to_string());
        self.page.set(page);
    }

    pub fn toggle_left(&self) {
        self.left_open.update(|val| *val = !*val);
    }
}

impl Default for AppGlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_app_context() -> AppGlobalContext {
    use_context::<AppGlobalContext>().expect("AppGlobalContext not found in component tree")
}

#[cfg(target_arch = "wasm32")]
fn current_search() -> String {
    window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn push_history(url: &str) {
    if let Some(w) = window() {
        if let Ok(history) = w.history() {
            let _ = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
        }
    }
}

// Native builds (tests) have no address bar; navigation only moves the signals
#[cfg(not(target_arch = "wasm32"))]
fn current_search() -> String {
    String::new()
}

#[cfg(not(target_arch = "wasm32"))]
fn push_history(_url: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_keys_round_trip() {
        for page in [
            AppPage::Dashboard,
            AppPage::FeatureSettings,
            AppPage::Feature(FeatureKey::Sos),
            AppPage::Feature(FeatureKey::Parcels),
        ] {
            assert_eq!(AppPage::from_key(page.key()), Some(page));
        }
        assert_eq!(AppPage::from_key("billing"), None);
    }

    #[test]
    fn test_page_from_query() {
        assert_eq!(page_from_query(""), AppPage::Dashboard);
        assert_eq!(page_from_query("?page=visitors"), AppPage::Feature(FeatureKey::Visitors));
        assert_eq!(
            page_from_query("?page=dashboard&error=feature_disabled&feature=sos"),
            AppPage::Dashboard
        );
        assert_eq!(page_from_query("?page=nowhere"), AppPage::Dashboard);
    }

    #[test]
    fn test_navigate_to_url_keeps_notice_in_search() {
        let owner = Owner::new();
        owner.set();

        let app = AppGlobalContext::new();
        app.navigate_to_url("?page=dashboard&error=feature_disabled&feature=sos");
        assert_eq!(app.page.get_untracked(), AppPage::Dashboard);
        assert_eq!(
            app.search.get_untracked(),
            "?page=dashboard&error=feature_disabled&feature=sos"
        );

        app.navigate(AppPage::Feature(FeatureKey::Parcels));
        assert_eq!(app.page.get_untracked(), AppPage::Feature(FeatureKey::Parcels));
        assert_eq!(app.search.get_untracked(), "?page=parcels");
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(AppPage::Feature(FeatureKey::Transport)), "?page=transport");
        assert_eq!(page_url(AppPage::FeatureSettings), "?page=settings-features");
    }
}
