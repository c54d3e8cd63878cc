use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, system};

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route(
            "/api/system/auth/login",
            post(system::handlers::auth::login),
        )
        .route(
            "/api/system/auth/refresh",
            post(system::handlers::auth::refresh),
        )
        .route(
            "/api/system/auth/logout",
            post(system::handlers::auth::logout),
        )
        // ========================================
        // PROTECTED ROUTES
        // ========================================
        .route(
            "/api/system/auth/me",
            get(system::handlers::auth::current_user)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/projects",
            get(handlers::a001_project::list)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/projects/:id/features",
            get(handlers::a001_project::get_features)
                .patch(handlers::a001_project::update_features)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
}
