use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::core::shared::models::{Department, User};
use crate::core::shared::state::AppState;
use crate::core::store::StoreError;
use crate::directory::accounts::{self, AccountError, SignedIn};
use crate::directory::forms::{LoginForm, RegisterForm};
use crate::directory::user_not_found;
use crate::security::auth_api::{clear_session_cookie, session_cookie, token_from_headers, AuthenticatedUser};
use crate::security::jwt::SessionToken;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub session: SessionToken,
}

fn signed_in_response(state: &AppState, status: StatusCode, signed_in: SignedIn) -> Response {
    let cookie = session_cookie(&state.auth_config, &signed_in.session.token);
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: signed_in.user,
            session: signed_in.session,
        }),
    )
        .into_response()
}

pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, AccountError> {
    let signed_in = accounts::register(&state, &form).await?;
    Ok(signed_in_response(&state, StatusCode::CREATED, signed_in))
}

pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Response, AccountError> {
    let signed_in = accounts::login(&state, &form).await?;
    Ok(signed_in_response(&state, StatusCode::OK, signed_in))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = token_from_headers(&headers, &state.auth_config);
    accounts::logout(&state, token.as_deref()).await;
    (
        [(header::SET_COOKIE, clear_session_cookie(&state.auth_config))],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<User>, StoreError> {
    state
        .directory
        .get_user(user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| user_not_found(user.user_id))
}

pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, StoreError> {
    state.directory.list_departments().await.map(Json)
}
