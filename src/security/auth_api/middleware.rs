use super::{
    error::AuthError,
    types::{evaluate, AuthenticatedUser, GateDecision, RouteAccess, SessionState},
    utils::extract_session_token,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::core::shared::state::AppState;

/// Resolves the request's session once and stores the outcome as a
/// [`SessionState`] extension. Never rejects on its own.
pub async fn resolve_session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let session = if state.auth_config.is_public_path(&path) {
        SessionState::Unauthenticated
    } else {
        match extract_session_token(&request, &state.auth_config) {
            Some(token) => resolve_token(&state, &token).await,
            None => SessionState::Unauthenticated,
        }
    };

    if let SessionState::Authenticated(user) = &session {
        debug!("{} {} as {} ({})", request.method(), path, user.email, user.role);
        request.extensions_mut().insert(user.clone());
    }
    request.extensions_mut().insert(session);
    next.run(request).await
}

async fn resolve_token(state: &AppState, token: &str) -> SessionState {
    let claims = match state.jwt.validate(token).await {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Ignoring session token: {}", e);
            return SessionState::Unauthenticated;
        }
    };
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(e) => {
            warn!("{}", e);
            return SessionState::Unauthenticated;
        }
    };
    match state.directory.get_user(user_id).await {
        Ok(Some(user)) => SessionState::Authenticated(AuthenticatedUser::from(user)),
        Ok(None) => {
            debug!("Session for unknown user {}", user_id);
            SessionState::Unauthenticated
        }
        Err(e) => {
            warn!("Session lookup failed for {}: {}", user_id, e);
            SessionState::Unauthenticated
        }
    }
}

fn session_of(request: &Request<Body>) -> SessionState {
    request
        .extensions()
        .get::<SessionState>()
        .cloned()
        .unwrap_or_default()
}

fn page_gate(access: RouteAccess, request: &Request<Body>) -> Option<Response> {
    match evaluate(&session_of(request), access) {
        GateDecision::Allow => None,
        GateDecision::Pending => {
            warn!("Session not resolved for {}", request.uri().path());
            Some(StatusCode::SERVICE_UNAVAILABLE.into_response())
        }
        GateDecision::Deny(denial) => Some(Redirect::to(denial.redirect_path()).into_response()),
    }
}

fn api_gate(access: RouteAccess, request: &Request<Body>) -> Result<(), AuthError> {
    match evaluate(&session_of(request), access) {
        GateDecision::Allow => Ok(()),
        GateDecision::Pending => Err(AuthError::InternalError(format!(
            "session not resolved for {}",
            request.uri().path()
        ))),
        GateDecision::Deny(denial) => Err(denial.api_error()),
    }
}

/// Screens for any signed-in user. Anonymous visitors go to `/login`.
pub async fn require_user_page(request: Request<Body>, next: Next) -> Response {
    match page_gate(RouteAccess::Authenticated, &request) {
        Some(response) => response,
        None => next.run(request).await,
    }
}

/// Admin screens. Signed-in users go to `/dashboard`, visitors to `/login`.
pub async fn require_admin_page(request: Request<Body>, next: Next) -> Response {
    match page_gate(RouteAccess::Admin, &request) {
        Some(response) => response,
        None => next.run(request).await,
    }
}

pub async fn require_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    api_gate(RouteAccess::Authenticated, &request)?;
    Ok(next.run(request).await)
}

pub async fn admin_only_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    api_gate(RouteAccess::Admin, &request)?;
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionState
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionState>()
            .cloned()
            .unwrap_or_default())
    }
}
