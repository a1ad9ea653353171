//! # Project Lifecycle API
//!
//! Every handler passes the caller straight to the registry, which owns
//! the authorization rules. Successful mutations are written through to
//! the database before the response is sent; a failed write rolls the
//! in-memory change back. Mutations of one project hold its write gate
//! across that write.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bcr_core::ProjectId;
use bcr_registry::ProjectRead;
use bcr_state::{ContentKind, LifecycleEvent, Project, ProjectAttributes, ProjectPatch};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

/// Request to create a draft project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Required; 1 to 200 characters after trimming.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location_address: String,
    /// e.g. `mangrove`, `seagrass`, `salt_marsh`.
    #[serde(default)]
    pub ecosystem_type: String,
    /// Hectares.
    #[serde(default)]
    pub project_area: Option<f64>,
    /// Tonnes of CO2 equivalent.
    #[serde(default)]
    pub estimated_co2_sequestration: Option<f64>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<CreateProjectRequest> for ProjectAttributes {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location_address: req.location_address,
            ecosystem_type: req.ecosystem_type,
            project_area: req.project_area,
            estimated_co2_sequestration: req.estimated_co2_sequestration,
            extra: req.extra,
        }
    }
}

/// Partial update of a draft's attributes. Absent fields are unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_address: Option<String>,
    pub ecosystem_type: Option<String>,
    pub project_area: Option<f64>,
    pub estimated_co2_sequestration: Option<f64>,
    /// Keys merged into the existing extra attributes.
    #[schema(value_type = Option<Object>)]
    pub extra: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<UpdateProjectRequest> for ProjectPatch {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location_address: req.location_address,
            ecosystem_type: req.ecosystem_type,
            project_area: req.project_area,
            estimated_co2_sequestration: req.estimated_co2_sequestration,
            extra: req.extra,
        }
    }
}

/// Request to fire a lifecycle event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// `submit`, `begin_review`, `approve`, `reject` or `tokenize`.
    #[schema(value_type = String)]
    pub event: LifecycleEvent,
}

/// Request to attach content. Exactly one of `content_ref` and `payload`.
///
/// With `payload`, the document is pinned in the content store first and
/// the returned identifier attached.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachContentRequest {
    /// `documentation`, `monitoring_evidence`, `verification_report`,
    /// `credit_metadata` or `retirement_certificate`.
    #[schema(value_type = String)]
    pub kind: ContentKind,
    /// An existing content identifier.
    pub content_ref: Option<String>,
    /// A JSON document to upload.
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
}

impl Validate for AttachContentRequest {
    fn validate(&self) -> Result<(), String> {
        match (&self.content_ref, &self.payload) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err("provide content_ref or payload, not both".into()),
            (None, None) => Err("one of content_ref or payload is required".into()),
        }
    }
}

/// Build the projects router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/projects", get(list_projects).post(create_project))
        .route("/v1/projects/review-queue", get(review_queue))
        .route("/v1/projects/:id", get(get_project).patch(update_project))
        .route("/v1/projects/:id/transitions", post(transition_project))
        .route("/v1/projects/:id/content", post(attach_content))
}

/// POST /v1/projects: Create a draft owned by the caller.
#[utoipa::path(
    post,
    path = "/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Draft created"),
        (status = 403, description = "Caller is not a submitter", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid attributes", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let req = extract_json(body)?;
    let project = state.projects.create(&caller.caller(), req.into())?;
    state.persist_new_project(&project).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /v1/projects: Projects owned by the caller, newest first.
#[utoipa::path(
    get,
    path = "/v1/projects",
    responses((status = 200, description = "Owned projects")),
    tag = "projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<Project>> {
    Json(state.projects.list_owned_by(caller.principal))
}

/// GET /v1/projects/review-queue: Submitted and under-review projects,
/// oldest first.
#[utoipa::path(
    get,
    path = "/v1/projects/review-queue",
    responses(
        (status = 200, description = "Projects awaiting review"),
        (status = 403, description = "Caller does not review", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn review_queue(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.projects.review_queue(&caller.caller())?))
}

/// GET /v1/projects/:id: One project, in the projection the caller may see.
#[utoipa::path(
    get,
    path = "/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Full or restricted projection"),
        (status = 403, description = "Visible but not permitted", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectRead>, AppError> {
    Ok(Json(state.projects.get(ProjectId::from_uuid(id), &caller.caller())?))
}

/// PATCH /v1/projects/:id: Edit a draft's attributes.
#[utoipa::path(
    patch,
    path = "/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Attributes updated"),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 423, description = "Project is past draft", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<Json<Project>, AppError> {
    let req = extract_json(body)?;
    let id = ProjectId::from_uuid(id);
    let _gate = state.write_gates.acquire(id).await;
    let before = state.projects.snapshot(id)?;
    let project = state.projects.edit(id, &caller.caller(), req.into())?;
    state.persist_project_change(before, &project).await?;
    Ok(Json(project))
}

/// POST /v1/projects/:id/transitions: Fire a lifecycle event.
#[utoipa::path(
    post,
    path = "/v1/projects/{id}/transitions",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Event not allowed", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn transition_project(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<Project>, AppError> {
    let req = extract_json(body)?;
    let id = ProjectId::from_uuid(id);
    let _gate = state.write_gates.acquire(id).await;
    let before = state.projects.snapshot(id)?;
    let project = state.projects.transition(id, &caller.caller(), req.event)?;
    state.persist_project_change(before, &project).await?;
    Ok(Json(project))
}

/// POST /v1/projects/:id/content: Attach a content reference.
#[utoipa::path(
    post,
    path = "/v1/projects/{id}/content",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = AttachContentRequest,
    responses(
        (status = 200, description = "Content attached (or already present)"),
        (status = 403, description = "Caller may not attach this kind", body = crate::error::ErrorBody),
        (status = 409, description = "Outside the attachment window", body = crate::error::ErrorBody),
        (status = 503, description = "Content store unavailable", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn attach_content(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<AttachContentRequest>, JsonRejection>,
) -> Result<Json<Project>, AppError> {
    let req = extract_validated_json(body)?;
    let id = ProjectId::from_uuid(id);
    let caller = caller.caller();

    // The upload runs before the write gate is taken.
    let content_ref = match (req.content_ref, req.payload) {
        (Some(content_ref), _) => content_ref,
        (None, Some(payload)) => {
            state
                .provenance
                .upload(id, req.kind, &payload, &caller, &state.content)
                .await?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "one of content_ref or payload is required".into(),
            ))
        }
    };

    let _gate = state.write_gates.acquire(id).await;
    let before = state.projects.snapshot(id)?;
    let project = state.provenance.attach(id, req.kind, &content_ref, &caller)?;
    state.persist_project_change(before, &project).await?;
    Ok(Json(project))
}
