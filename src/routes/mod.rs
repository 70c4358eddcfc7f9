//! Route definitions for the dashboard API.

pub mod access;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod profiles;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::middleware::simulation;
use crate::AppState;

/// Slack above the avatar limit for the rest of a multipart body.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!(error = %e, frontend_url = %frontend_url, "Invalid FRONTEND_URL, CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let data_routes = Router::new()
        .route("/stats", get(dashboard::stats))
        .route("/revenue", get(dashboard::revenue))
        .route("/orders", get(dashboard::orders))
        .route("/users", get(dashboard::users))
        .route("/traffic", get(dashboard::traffic))
        .route("/export/{report}", get(export::download));

    let profile_routes = Router::new()
        .route("/profiles", get(profiles::list))
        .route("/profiles/update", post(profiles::update));

    let access_routes = Router::new()
        .route("/access/check", get(access::check))
        .route("/access/navigation", get(access::navigation));

    let api = Router::new()
        .merge(auth_routes)
        .merge(data_routes)
        .merge(profile_routes)
        .merge(access_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            simulation::simulate,
        ));

    let body_limit = state.config.avatar_max_bytes + BODY_LIMIT_SLACK;
    let public_dir = state.config.public_dir.clone();
    let cors = cors_layer(&state.config.frontend_url);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", api)
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
