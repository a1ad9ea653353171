//! # bcr-api: HTTP Surface for the Blue Carbon Registry
//!
//! ## API Surface
//!
//! | Prefix                  | Module                 | Auth    |
//! |-------------------------|------------------------|---------|
//! | `/v1/auth/*`            | [`routes::auth`]       | mixed   |
//! | `/v1/projects/*`        | [`routes::projects`]   | bearer  |
//! | `/v1/public/projects/*` | [`routes::public`]     | none    |
//! | `/openapi.json`         | [`openapi`]            | none    |
//! | `/health/*`             | this module            | none    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware (protected routes only) → Handler
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside every layer so they
/// stay cheap and accessible without credentials.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let protected = Router::new()
        .merge(routes::auth::protected_router())
        .merge(routes::projects::router())
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::public::router())
        .merge(openapi::router())
        .merge(protected)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
