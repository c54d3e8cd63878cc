use web_sys::window;

const ACCESS_TOKEN_KEY: &str = "mv_access_token";
const REFRESH_TOKEN_KEY: &str = "mv_refresh_token";
const ACTIVE_PROJECT_KEY: &str = "mv_active_project";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

fn set(key: &str, value: &str) {
    if let Some(storage) = get_local_storage() {
        let _ = storage.set_item(key, value);
    }
}

fn get(key: &str) -> Option<String> {
    get_local_storage()?.get_item(key).ok()?
}

pub fn save_access_token(token: &str) {
    set(ACCESS_TOKEN_KEY, token);
}

pub fn get_access_token() -> Option<String> {
    get(ACCESS_TOKEN_KEY)
}

pub fn save_refresh_token(token: &str) {
    set(REFRESH_TOKEN_KEY, token);
}

pub fn get_refresh_token() -> Option<String> {
    get(REFRESH_TOKEN_KEY)
}

/// Project a super-admin last switched to
pub fn save_active_project(project_id: &str) {
    set(ACTIVE_PROJECT_KEY, project_id);
}

pub fn get_active_project() -> Option<String> {
    get(ACTIVE_PROJECT_KEY).filter(|id| !id.is_empty())
}

/// Clear tokens and the remembered project
pub fn clear_tokens() {
    if let Some(storage) = get_local_storage() {
        let _ = storage.remove_item(ACCESS_TOKEN_KEY);
        let _ = storage.remove_item(REFRESH_TOKEN_KEY);
        let _ = storage.remove_item(ACTIVE_PROJECT_KEY);
    }
}
