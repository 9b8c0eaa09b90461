//! Shared HTML chrome: layout, navigation, flash banners and badges.
//!
//! Screens are plain `format!` templates; every dynamic string goes through
//! [`html_escape`] before it reaches the page.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::core::shared::enums::{Role, TicketPriority, TicketStatus};
use crate::core::urls::PageUrls;
use crate::security::auth_api::{AuthenticatedUser, SessionState};

const STYLESHEET: &str = include_str!("../../assets/helpdesk.css");

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn priority_badge(priority: TicketPriority) -> &'static str {
    match priority {
        TicketPriority::High => "<span class=\"badge badge-danger\">High</span>",
        TicketPriority::Medium => "<span class=\"badge badge-warning\">Medium</span>",
        TicketPriority::Low => "<span class=\"badge badge-secondary\">Low</span>",
    }
}

pub fn status_badge(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "<span class=\"badge badge-primary\">Open</span>",
        TicketStatus::InProgress => "<span class=\"badge badge-info\">In Progress</span>",
        TicketStatus::Resolved => "<span class=\"badge badge-success\">Resolved</span>",
        TicketStatus::Closed => "<span class=\"badge badge-secondary\">Closed</span>",
    }
}

pub fn render_empty_state(icon: &str, title: &str, description: &str) -> String {
    format!(
        "<div class=\"empty-state\">\
            <div class=\"empty-icon\">{}</div>\
            <h3>{}</h3>\
            <p>{}</p>\
        </div>",
        icon,
        html_escape(title),
        html_escape(description)
    )
}

/// One-shot notification carried in the query string after a redirect.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Flash {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            notice: None,
            error: Some(message.into()),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            error: None,
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::new();
        if let Some(error) = self.error.as_deref().filter(|m| !m.is_empty()) {
            html.push_str(&format!(
                "<div class=\"flash flash-error\" role=\"alert\">{}</div>",
                html_escape(error)
            ));
        }
        if let Some(notice) = self.notice.as_deref().filter(|m| !m.is_empty()) {
            html.push_str(&format!(
                "<div class=\"flash flash-notice\" role=\"status\">{}</div>",
                html_escape(notice)
            ));
        }
        html
    }
}

pub fn redirect_with_notice(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(message))).into_response()
}

pub fn redirect_with_error(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{}?error={}", path, urlencoding::encode(message))).into_response()
}

fn render_nav(user: Option<&AuthenticatedUser>) -> String {
    let links = match user {
        None => format!(
            "<a href=\"{}\">Sign in</a><a href=\"{}\" class=\"btn-sm\">Register</a>",
            PageUrls::LOGIN,
            PageUrls::REGISTER
        ),
        Some(user) => {
            let role_links = match user.role {
                Role::Admin => format!(
                    "<a href=\"{}\">Dashboard</a><a href=\"{}\">All Tickets</a>",
                    PageUrls::ADMIN_DASHBOARD,
                    PageUrls::ADMIN_TICKETS
                ),
                Role::User => format!(
                    "<a href=\"{}\">Dashboard</a><a href=\"{}\">My Tickets</a><a href=\"{}\">New Ticket</a>",
                    PageUrls::DASHBOARD,
                    PageUrls::MY_TICKETS,
                    PageUrls::NEW_TICKET
                ),
            };
            format!(
                "{role_links}<a href=\"{settings}\">Settings</a>\
                 <span class=\"nav-user\">{name}</span>\
                 <a href=\"{logout}\" class=\"btn-sm\">Sign out</a>",
                role_links = role_links,
                settings = PageUrls::SETTINGS,
                name = html_escape(&user.name),
                logout = PageUrls::LOGOUT,
            )
        }
    };
    format!(
        "<nav class=\"topbar\">\
            <a class=\"brand\" href=\"/\">IT Helpdesk</a>\
            <div class=\"nav-links\">{}</div>\
        </nav>",
        links
    )
}

pub fn render_page(
    title: &str,
    user: Option<&AuthenticatedUser>,
    flash: &Flash,
    body: &str,
) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\
        <html lang=\"en\">\
        <head>\
            <meta charset=\"utf-8\">\
            <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
            <title>{title} · IT Helpdesk</title>\
            <link rel=\"stylesheet\" href=\"/static/helpdesk.css\">\
        </head>\
        <body>\
            {nav}\
            <main class=\"container\">{flash}{body}</main>\
        </body>\
        </html>",
        title = html_escape(title),
        nav = render_nav(user),
        flash = flash.render(),
        body = body,
    ))
}

pub fn format_timestamp(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Landing page. Signed-in visitors get a shortcut to their dashboard.
pub async fn index_page(session: SessionState) -> Html<String> {
    let call_to_action = match session.user() {
        Some(user) => format!(
            "<a class=\"btn btn-primary\" href=\"{}\">Go to dashboard</a>",
            user.role.home_path()
        ),
        None => format!(
            "<a class=\"btn btn-primary\" href=\"{}\">Sign in</a>\
             <a class=\"btn\" href=\"{}\">Create an account</a>",
            PageUrls::LOGIN,
            PageUrls::REGISTER
        ),
    };
    let body = format!(
        "<section class=\"hero\">\
            <h1>IT Helpdesk</h1>\
            <p>Report a problem, follow its progress and talk to the support team in one place.</p>\
            <div class=\"hero-actions\">{}</div>\
        </section>\
        <section class=\"features\">\
            <div class=\"card\"><h3>Submit tickets</h3><p>Describe the issue, pick a department and attach a screenshot.</p></div>\
            <div class=\"card\"><h3>Track progress</h3><p>See when a ticket is picked up, who is working on it and when it is resolved.</p></div>\
            <div class=\"card\"><h3>Stay in the loop</h3><p>Reply to the support team directly on the ticket.</p></div>\
        </section>",
        call_to_action
    );
    render_page("Welcome", session.user(), &Flash::default(), &body)
}

pub async fn not_found_page(session: SessionState) -> Response {
    let home = session
        .user()
        .map(|user| user.role.home_path())
        .unwrap_or(PageUrls::INDEX);
    let body = format!(
        "{}<p class=\"center\"><a class=\"btn\" href=\"{}\">Back to safety</a></p>",
        render_empty_state("404", "Page not found", "The page you are looking for does not exist."),
        home
    );
    (
        StatusCode::NOT_FOUND,
        render_page("Not found", session.user(), &Flash::default(), &body),
    )
        .into_response()
}

pub async fn static_asset(Path(path): Path<String>) -> Response {
    match path.as_str() {
        "helpdesk.css" => (
            [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
            STYLESHEET,
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_flash_render_escapes() {
        let flash = Flash::error("<b>bad</b>");
        let html = flash.render();
        assert!(html.contains("flash-error"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(Flash::default().render().is_empty());
    }

    #[test]
    fn test_redirect_encodes_message() {
        let response = redirect_with_error("/login", "Invalid email or password");
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("location");
        assert_eq!(location, "/login?error=Invalid%20email%20or%20password");
    }

    #[test]
    fn test_nav_depends_on_role() {
        let admin = AuthenticatedUser::new(uuid::Uuid::new_v4(), "Root").with_role(Role::Admin);
        let nav = render_nav(Some(&admin));
        assert!(nav.contains(PageUrls::ADMIN_TICKETS));
        assert!(!nav.contains(PageUrls::NEW_TICKET));

        let user = AuthenticatedUser::new(uuid::Uuid::new_v4(), "Jo");
        let nav = render_nav(Some(&user));
        assert!(nav.contains(PageUrls::NEW_TICKET));
        assert!(!nav.contains(PageUrls::ADMIN_TICKETS));

        assert!(render_nav(None).contains(PageUrls::LOGIN));
    }

    #[test]
    fn test_badges() {
        assert!(status_badge(TicketStatus::InProgress).contains("In Progress"));
        assert!(priority_badge(TicketPriority::High).contains("badge-danger"));
    }
}
