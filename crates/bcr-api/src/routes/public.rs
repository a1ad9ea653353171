//! # Public Catalogue API
//!
//! Unauthenticated, read-only access to verified and tokenized projects
//! in their restricted projection.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use bcr_core::ProjectId;
use bcr_registry::{Page, PublicProject};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

/// Pagination for the public listing.
#[derive(Debug, Deserialize, Default)]
pub struct PublicListParams {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Items per page (default 10, max 100).
    pub per_page: Option<u32>,
}

/// Build the public router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/public/projects", get(list_public_projects))
        .route("/v1/public/projects/:id", get(get_public_project))
}

/// GET /v1/public/projects: Verified and tokenized projects, newest first.
///
/// An empty registry yields an empty page.
#[utoipa::path(
    get,
    path = "/v1/public/projects",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number (default 1)"),
        ("per_page" = Option<u32>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "One page of public projects"),
        (status = 422, description = "Page or per_page out of range", body = crate::error::ErrorBody),
    ),
    tag = "public"
)]
pub async fn list_public_projects(
    State(state): State<AppState>,
    params: Result<Query<PublicListParams>, QueryRejection>,
) -> Result<Json<Page<PublicProject>>, AppError> {
    let params = extract_query(params)?;
    Ok(Json(state.projects.list_public(params.page, params.per_page)?))
}

/// GET /v1/public/projects/:id: One public project.
///
/// Anything not verified or tokenized is 404.
#[utoipa::path(
    get,
    path = "/v1/public/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Restricted projection"),
        (status = 404, description = "Not found or not public", body = crate::error::ErrorBody),
    ),
    tag = "public"
)]
pub async fn get_public_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicProject>, AppError> {
    Ok(Json(state.projects.get_public(ProjectId::from_uuid(id))?))
}
