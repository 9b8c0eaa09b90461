/// HTML screens and form targets.
#[derive(Debug)]
pub struct PageUrls;

impl PageUrls {
    pub const INDEX: &'static str = "/";
    pub const LOGIN: &'static str = "/login";
    pub const REGISTER: &'static str = "/register";
    pub const LOGOUT: &'static str = "/logout";
    pub const SETTINGS: &'static str = "/settings";
    pub const STATIC: &'static str = "/static/*path";

    // User screens
    pub const DASHBOARD: &'static str = "/dashboard";
    pub const MY_TICKETS: &'static str = "/my-tickets";
    pub const NEW_TICKET: &'static str = "/new-ticket";
    pub const TICKET: &'static str = "/ticket/:id";
    pub const TICKET_COMMENTS: &'static str = "/ticket/:id/comments";

    // Admin screens
    pub const ADMIN_DASHBOARD: &'static str = "/admin/dashboard";
    pub const ADMIN_TICKETS: &'static str = "/admin/tickets";
    pub const ADMIN_TICKET: &'static str = "/admin/ticket/:id";
    pub const ADMIN_TICKET_STATUS: &'static str = "/admin/ticket/:id/status";
    pub const ADMIN_TICKET_ASSIGN: &'static str = "/admin/ticket/:id/assign";
    pub const ADMIN_TICKET_COMMENTS: &'static str = "/admin/ticket/:id/comments";
}

#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    pub const HEALTH: &'static str = "/api/health";

    // Auth - JSON APIs
    pub const AUTH_REGISTER: &'static str = "/api/auth/register";
    pub const AUTH_LOGIN: &'static str = "/api/auth/login";
    pub const AUTH_LOGOUT: &'static str = "/api/auth/logout";
    pub const AUTH_ME: &'static str = "/api/auth/me";

    pub const DEPARTMENTS: &'static str = "/api/departments";

    // Tickets - JSON APIs
    pub const TICKETS: &'static str = "/api/tickets";
    pub const TICKET_BY_ID: &'static str = "/api/tickets/:id";
    pub const TICKET_STATUS: &'static str = "/api/tickets/:id/status";
    pub const TICKET_ASSIGN: &'static str = "/api/tickets/:id/assign";
    pub const TICKET_COMMENTS: &'static str = "/api/tickets/:id/comments";

    // Admin - JSON APIs
    pub const ADMIN_STATS: &'static str = "/api/admin/stats";
    pub const ADMIN_ASSIGNEES: &'static str = "/api/admin/assignees";
}

/// Concrete links for a ticket id.
pub fn ticket_path(id: uuid::Uuid) -> String {
    format!("/ticket/{}", id)
}

pub fn admin_ticket_path(id: uuid::Uuid) -> String {
    format!("/admin/ticket/{}", id)
}
