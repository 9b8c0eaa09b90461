//! Accounts and departments.

pub mod accounts;
pub mod forms;
pub mod handlers;
pub mod ui;

use async_trait::async_trait;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::core::shared::enums::Role;
use crate::core::shared::models::{Department, User};
use crate::core::shared::state::AppState;
use crate::core::store::StoreError;
use crate::core::urls::{ApiUrls, PageUrls};
use crate::security::auth_api::{require_auth_middleware, require_user_page};

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
}

/// A profile together with its stored password hash, for login only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create_user(&self, profile: NewProfile) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: &str,
        department_id: Option<Uuid>,
    ) -> Result<User, StoreError>;

    /// Profiles that tickets can be assigned to, ordered by name.
    async fn list_admins(&self) -> Result<Vec<User>, StoreError>;

    /// All departments ordered by name.
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
}

pub fn email_taken() -> StoreError {
    StoreError::Conflict("An account with this email already exists".to_string())
}

pub fn user_not_found(user_id: Uuid) -> StoreError {
    StoreError::NotFound(format!("User {} not found", user_id))
}

/// Account API. Registration, login, logout and the department catalog are
/// open; `/api/auth/me` needs a session.
pub fn configure_directory_routes() -> Router<AppState> {
    let signed_in = Router::new()
        .route(ApiUrls::AUTH_ME, get(handlers::me))
        .route_layer(middleware::from_fn(require_auth_middleware));

    Router::new()
        .route(ApiUrls::AUTH_REGISTER, post(handlers::register))
        .route(ApiUrls::AUTH_LOGIN, post(handlers::login))
        .route(ApiUrls::AUTH_LOGOUT, post(handlers::logout))
        .route(ApiUrls::DEPARTMENTS, get(handlers::list_departments))
        .merge(signed_in)
}

pub fn configure_directory_ui_routes() -> Router<AppState> {
    let settings = Router::new()
        .route(
            PageUrls::SETTINGS,
            get(ui::settings_page).post(ui::submit_settings),
        )
        .route_layer(middleware::from_fn(require_user_page));

    Router::new()
        .route(PageUrls::LOGIN, get(ui::login_page).post(ui::submit_login))
        .route(
            PageUrls::REGISTER,
            get(ui::register_page).post(ui::submit_register),
        )
        .route(PageUrls::LOGOUT, get(ui::logout))
        .merge(settings)
}
