use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;
use crate::core::shared::enums::Role;
use crate::core::shared::models::{Ticket, User};

/// The signed-in person behind a request, as currently stored in the
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub department: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: String::new(),
            role: Role::User,
            department_id: None,
            department: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn is_admin(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::User => false,
        }
    }

    /// Admins see every ticket; users only their own.
    pub fn can_view_ticket(&self, ticket: &Ticket) -> bool {
        match self.role {
            Role::Admin => true,
            Role::User => ticket.created_by == self.user_id,
        }
    }
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department_id: user.department_id,
            department: user.department,
        }
    }
}

/// Where a request stands in session resolution.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Lookup not finished. Nothing may be rendered yet.
    #[default]
    Checking,
    Authenticated(AuthenticatedUser),
    Unauthenticated,
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Checking | Self::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDenial {
    NotSignedIn,
    NotAdmin,
}

impl GateDenial {
    /// Screen an HTML request is sent to instead.
    pub fn redirect_path(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "/login",
            Self::NotAdmin => "/dashboard",
        }
    }

    pub fn api_error(&self) -> AuthError {
        match self {
            Self::NotSignedIn => AuthError::MissingToken,
            Self::NotAdmin => AuthError::InsufficientPermissions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pending,
    Allow,
    Deny(GateDenial),
}

pub fn evaluate(session: &SessionState, access: RouteAccess) -> GateDecision {
    match (session, access) {
        (_, RouteAccess::Public) => GateDecision::Allow,
        (SessionState::Checking, _) => GateDecision::Pending,
        (SessionState::Unauthenticated, _) => GateDecision::Deny(GateDenial::NotSignedIn),
        (SessionState::Authenticated(_), RouteAccess::Authenticated) => GateDecision::Allow,
        (SessionState::Authenticated(user), RouteAccess::Admin) => match user.role {
            Role::Admin => GateDecision::Allow,
            Role::User => GateDecision::Deny(GateDenial::NotAdmin),
        },
    }
}
