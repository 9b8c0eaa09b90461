//! Registration, login and logout, shared by the JSON API and the screens.

use axum::response::{IntoResponse, Response};
use thiserror::Error;
use log::{info, warn};

use crate::core::shared::enums::Role;
use crate::core::shared::models::User;
use crate::core::shared::state::AppState;
use crate::core::store::StoreError;
use crate::directory::forms::{LoginForm, RegisterForm};
use crate::directory::NewProfile;
use crate::security::auth_api::AuthError;
use crate::security::jwt::SessionToken;
use crate::security::password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AccountError {
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(e) => e.public_message(),
            Self::Auth(e) => e.message(),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match self {
            Self::Store(e) => e.into_response(),
            Self::Auth(e) => e.into_response(),
        }
    }
}

/// A user together with a freshly issued session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub session: SessionToken,
}

fn start_session(state: &AppState, user: User) -> Result<SignedIn, AccountError> {
    let session = state
        .jwt
        .issue_session(&user)
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
    Ok(SignedIn { user, session })
}

pub async fn register(state: &AppState, form: &RegisterForm) -> Result<SignedIn, AccountError> {
    let registration = form.validate()?;

    if state
        .directory
        .find_user_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(crate::directory::email_taken().into());
    }

    let role = if state.config.auth.is_admin_email(&registration.email) {
        Role::Admin
    } else {
        Role::User
    };

    let password = registration.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(StoreError::from)?
        .map_err(|e| StoreError::Internal(e.to_string()))?;

    let user = state
        .directory
        .create_user(NewProfile {
            name: registration.name,
            email: registration.email,
            password_hash,
            role,
            department_id: Some(registration.department_id),
        })
        .await?;
    info!("Registered {} as {}", user.id, user.role);

    start_session(state, user)
}

/// Unknown email and wrong password fail the same way.
pub async fn login(state: &AppState, form: &LoginForm) -> Result<SignedIn, AccountError> {
    let email = form.validate()?;

    let Some(credentials) = state.directory.find_credentials(&email).await? else {
        warn!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };

    let password = form.password.clone();
    let stored = credentials.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(StoreError::from)?;
    if !matches {
        warn!("Failed login for user {}", credentials.user.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    info!("User {} signed in", credentials.user.id);
    start_session(state, credentials.user)
}

/// Revokes the session token if it is still valid. Missing or broken tokens
/// are ignored so logout always succeeds.
pub async fn logout(state: &AppState, token: Option<&str>) {
    if let Some(token) = token {
        if let Err(e) = state.jwt.revoke(token).await {
            info!("Logout with unusable token: {}", e.error_code());
        }
    }
}
