//! Support tickets: storage seam, list filtering, dashboards, JSON API and
//! server-rendered screens.

pub mod filter;
pub mod forms;
pub mod handlers;
pub mod repository;
pub mod stats;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::core::shared::state::AppState;
use crate::core::urls::{ApiUrls, PageUrls};
use crate::security::auth_api::{
    admin_only_middleware, require_admin_page, require_auth_middleware, require_user_page,
};

pub use repository::{NewTicket, TicketRepository, UploadedFile};

/// Ticket API for any signed-in user. `upload_limit` caps the multipart
/// body of ticket creation; see [`forms::upload_body_limit`].
pub fn configure_tickets_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            ApiUrls::TICKETS,
            get(handlers::list_tickets)
                .post(handlers::create_ticket)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(ApiUrls::TICKET_BY_ID, get(handlers::get_ticket))
        .route(ApiUrls::TICKET_COMMENTS, post(handlers::add_comment))
        .route_layer(middleware::from_fn(require_auth_middleware))
}

pub fn configure_admin_tickets_routes() -> Router<AppState> {
    Router::new()
        .route(ApiUrls::TICKET_STATUS, put(handlers::change_status))
        .route(ApiUrls::TICKET_ASSIGN, put(handlers::assign_ticket))
        .route(ApiUrls::ADMIN_STATS, get(handlers::admin_stats))
        .route(ApiUrls::ADMIN_ASSIGNEES, get(handlers::list_assignees))
        .route_layer(middleware::from_fn(admin_only_middleware))
}

pub fn configure_tickets_ui_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(PageUrls::DASHBOARD, get(ui::dashboard_page))
        .route(PageUrls::MY_TICKETS, get(ui::my_tickets_page))
        .route(
            PageUrls::NEW_TICKET,
            get(ui::new_ticket_page)
                .post(ui::submit_new_ticket)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(PageUrls::TICKET, get(ui::ticket_page))
        .route(PageUrls::TICKET_COMMENTS, post(ui::submit_ticket_comment))
        .route_layer(middleware::from_fn(require_user_page))
}

pub fn configure_admin_tickets_ui_routes() -> Router<AppState> {
    Router::new()
        .route(PageUrls::ADMIN_DASHBOARD, get(ui::admin_dashboard_page))
        .route(PageUrls::ADMIN_TICKETS, get(ui::admin_tickets_page))
        .route(PageUrls::ADMIN_TICKET, get(ui::admin_ticket_page))
        .route(PageUrls::ADMIN_TICKET_STATUS, post(ui::submit_admin_status))
        .route(PageUrls::ADMIN_TICKET_ASSIGN, post(ui::submit_admin_assign))
        .route(PageUrls::ADMIN_TICKET_COMMENTS, post(ui::submit_admin_comment))
        .route_layer(middleware::from_fn(require_admin_page))
}
