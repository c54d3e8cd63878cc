//! Helpers for building backend URLs and authorized requests.

use gloo_net::http::RequestBuilder;

use crate::system::auth::storage;

const BACKEND_PORT: u16 = 3000;

/// Base URL of the backend, derived from the current window location.
///
/// Returns an empty string outside a browser window.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, BACKEND_PORT)
}

/// Full URL for an `/api/...` path
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

/// Attach the stored bearer token, if any
pub fn with_auth(builder: RequestBuilder) -> RequestBuilder {
    match storage::get_access_token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}
