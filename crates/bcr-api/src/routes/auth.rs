//! # Principal Authentication API
//!
//! Registration and login hash or verify secrets with Argon2id, which is
//! deliberately slow; both run on the blocking thread pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bcr_core::Role;
use bcr_registry::{Principal, PrincipalView, Profile, Registration};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{bearer_credential, CallerIdentity};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Request to register a principal.
///
/// No `Debug`: the body carries a plaintext secret.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// E-mail style login identity. Trimmed and lowercased.
    pub identity: String,
    /// At least 6 characters.
    pub secret: String,
    /// At least 2 characters.
    pub display_name: String,
    /// `submitter`, `reviewer`, `administrator` or `consumer` (default).
    /// Legacy names `developer`, `verifier`, `admin`, `buyer` are accepted.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request to log in.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub identity: String,
    pub secret: String,
}

/// A principal together with a fresh bearer credential.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    #[schema(value_type = Object)]
    pub principal: PrincipalView,
    pub token: String,
}

/// A refreshed bearer credential.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Unauthenticated routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/refresh", post(refresh))
}

/// Routes behind the auth middleware.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/v1/auth/me", get(me))
}

/// POST /v1/auth/register: Register a principal and log it in.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Principal registered", body = AuthResponse),
        (status = 409, description = "Identity already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid registration", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = extract_json(body)?;
    let role = req.role.as_deref().map(str::parse::<Role>).transpose()?;
    let registration = Registration {
        identity: req.identity,
        secret: req.secret,
        display_name: req.display_name,
        role,
        profile: Profile {
            organization: req.organization,
            country: req.country,
            phone: req.phone,
        },
    };

    let principals = state.principals.clone();
    let principal = tokio::task::spawn_blocking(move || principals.register(registration))
        .await
        .map_err(|e| AppError::Internal(format!("registration task failed: {e}")))??;
    state.persist_principal(&principal).await?;

    tracing::info!(principal = %principal.id, role = %principal.role, "principal registered");
    Ok((StatusCode::CREATED, Json(issue(&state, &principal))))
}

/// POST /v1/auth/login: Exchange identity and secret for a credential.
///
/// Unknown identity and wrong secret produce the same 401.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let LoginRequest { identity, secret } = extract_json(body)?;

    let principals = state.principals.clone();
    let principal = tokio::task::spawn_blocking(move || principals.authenticate(&identity, &secret))
        .await
        .map_err(|e| AppError::Internal(format!("login task failed: {e}")))??;

    tracing::info!(principal = %principal.id, "principal logged in");
    Ok(Json(issue(&state, &principal)))
}

/// GET /v1/auth/me: The authenticated principal.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current principal"),
        (status = 401, description = "Missing or invalid credential", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<PrincipalView>, AppError> {
    let principal = state.principals.resolve_id(caller.principal)?;
    Ok(Json(PrincipalView::from(&principal)))
}

/// POST /v1/auth/refresh: Re-issue a credential.
///
/// Accepts an expired credential as long as its signature is valid and
/// its subject still exists.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    responses(
        (status = 200, description = "Credential refreshed", body = TokenResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let credential = bearer_credential(&headers)?;
    let refreshed = state.tokens.refresh(&credential)?;
    let subject = state.tokens.verify(&refreshed)?;
    state
        .principals
        .resolve_id(subject)
        .map_err(|_| AppError::Unauthorized("credential subject is unknown".into()))?;
    Ok(Json(TokenResponse {
        token: refreshed.into_string(),
    }))
}

fn issue(state: &AppState, principal: &Principal) -> AuthResponse {
    let token = state.tokens.issue(principal.id, state.tokens.default_ttl());
    AuthResponse {
        principal: PrincipalView::from(principal),
        token: token.into_string(),
    }
}
