//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served unauthenticated at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blue Carbon Registry API",
        version = "0.1.0",
        description = "Registry of record for coastal restoration projects: principals, project lifecycle, provenance, and the public catalogue.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Auth
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::refresh,
        // Projects
        crate::routes::projects::create_project,
        crate::routes::projects::list_projects,
        crate::routes::projects::review_queue,
        crate::routes::projects::get_project,
        crate::routes::projects::update_project,
        crate::routes::projects::transition_project,
        crate::routes::projects::attach_content,
        // Public
        crate::routes::public::list_public_projects,
        crate::routes::public::get_public_project,
    ),
    components(schemas(
        crate::routes::auth::RegisterRequest,
        crate::routes::auth::LoginRequest,
        crate::routes::auth::AuthResponse,
        crate::routes::auth::TokenResponse,
        crate::routes::projects::CreateProjectRequest,
        crate::routes::projects::UpdateProjectRequest,
        crate::routes::projects::TransitionRequest,
        crate::routes::projects::AttachContentRequest,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "auth", description = "Registration, login, and credentials"),
        (name = "projects", description = "Project lifecycle and provenance"),
        (name = "public", description = "Public catalogue"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&str> = spec.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/v1/auth/register",
            "/v1/auth/login",
            "/v1/auth/me",
            "/v1/auth/refresh",
            "/v1/projects",
            "/v1/projects/review-queue",
            "/v1/projects/{id}",
            "/v1/projects/{id}/transitions",
            "/v1/projects/{id}/content",
            "/v1/public/projects",
            "/v1/public/projects/{id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
