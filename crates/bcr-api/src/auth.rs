//! # Authentication Middleware
//!
//! Bearer credential middleware. Every request under the protected router
//! must carry `Authorization: Bearer <credential>`; the credential is
//! verified with the [`TokenService`](bcr_crypto::TokenService) and
//! resolved to a live principal before the handler runs.
//!
//! ## CallerIdentity
//!
//! The resolved principal's id and role are injected into the request
//! extensions as a [`CallerIdentity`]. Handlers extract it via the
//! `FromRequestParts` impl and hand [`CallerIdentity::caller`] to the
//! registry, which makes every authorization decision.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bcr_core::{PrincipalId, Role};
use bcr_crypto::Credential;
use bcr_state::Caller;

use crate::error::AppError;
use crate::state::AppState;

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The authenticated principal.
    pub principal: PrincipalId,
    /// The principal's role, read from the credential store on every
    /// request.
    pub role: Role,
}

impl CallerIdentity {
    /// The caller as the access evaluator sees it.
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.principal,
            role: self.role,
        }
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Bearer Parsing ──────────────────────────────────────────────────────────

/// Read the bearer credential from the `Authorization` header.
pub fn bearer_credential(headers: &HeaderMap) -> Result<Credential, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("authorization header is not ASCII".into()))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::Unauthorized("authorization header must use Bearer scheme".into())
        })?
        .trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("empty bearer credential".into()));
    }
    Ok(Credential::from_bearer(token))
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Verify the bearer credential and inject the caller's identity.
///
/// A credential for a principal that no longer exists is treated like an
/// invalid one.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(reason = %err, "authentication failed");
            err.into_response()
        }
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, AppError> {
    let credential = bearer_credential(headers)?;
    let principal_id = state.tokens.verify(&credential)?;
    let principal = state
        .principals
        .resolve_id(principal_id)
        .map_err(|_| AppError::Unauthorized("credential subject is unknown".into()))?;
    Ok(CallerIdentity {
        principal: principal.id,
        role: principal.role,
    })
}
