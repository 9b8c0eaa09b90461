//! Session authentication and the role gate in front of every screen.
//!
//! A request passes through two layers: [`resolve_session_middleware`] turns
//! the cookie or bearer token into a [`SessionState`], then one of the gate
//! middlewares decides whether the handler may run. HTML routes are
//! redirected, API routes get a JSON error.

pub mod config;
pub mod error;
pub mod middleware;
pub mod types;
pub mod utils;

pub use config::AuthConfig;
pub use error::AuthError;
pub use middleware::{
    admin_only_middleware, require_admin_page, require_auth_middleware, require_user_page,
    resolve_session_middleware,
};
pub use types::{evaluate, AuthenticatedUser, GateDecision, GateDenial, RouteAccess, SessionState};
pub use utils::{
    clear_session_cookie, extract_session_from_cookies, extract_session_token, session_cookie,
    token_from_headers,
};
