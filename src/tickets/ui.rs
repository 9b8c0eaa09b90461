//! Server-rendered ticket screens for requesters and admins.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use log::{error, info};
use uuid::Uuid;

use crate::core::shared::enums::{Role, TicketPriority, TicketStatus};
use crate::core::shared::models::{Attachment, Comment, Department, Ticket, User};
use crate::core::shared::state::AppState;
use crate::core::store::StoreError;
use crate::core::urls::{admin_ticket_path, ticket_path, PageUrls};
use crate::security::auth_api::AuthenticatedUser;
use crate::tickets::filter::{department_options, TicketFilter, TicketListQuery, TicketSort};
use crate::tickets::forms::{AssignForm, CommentForm, NewTicketForm, StatusForm};
use crate::tickets::handlers::{effective_internal_flag, load_visible_ticket, scoped_tickets};
use crate::tickets::repository::ticket_not_found;
use crate::tickets::stats::{admin_dashboard, user_dashboard, CountEntry};
use crate::web::{
    format_timestamp, html_escape, priority_badge, redirect_with_error, redirect_with_notice,
    render_empty_state, render_page, status_badge, Flash,
};

/// Logs server-side failures and returns the text safe to show.
fn report(context: &str, err: &StoreError) -> String {
    if err.is_server_error() {
        error!("{context}: {err}");
    }
    err.public_message()
}

fn failure_page(user: &AuthenticatedUser, title: &str, err: &StoreError) -> Response {
    let message = report(title, err);
    let body = render_empty_state("!", "Something went wrong", &message);
    (
        err.status_code(),
        render_page(title, Some(user), &Flash::default(), &body),
    )
        .into_response()
}

/// 404 screen for a ticket that does not exist or is not the viewer's.
fn ticket_not_found_page(user: &AuthenticatedUser) -> Response {
    let back = match user.role {
        Role::Admin => PageUrls::ADMIN_TICKETS,
        Role::User => PageUrls::MY_TICKETS,
    };
    let body = format!(
        "{}<p class=\"center\"><a class=\"btn\" href=\"{}\">Back to tickets</a></p>",
        render_empty_state(
            "?",
            "Ticket not found",
            "The ticket you are looking for does not exist or you do not have access to it."
        ),
        back
    );
    (
        StatusCode::NOT_FOUND,
        render_page("Ticket not found", Some(user), &Flash::default(), &body),
    )
        .into_response()
}

fn ticket_link(viewer: Role, ticket: &Ticket) -> String {
    match viewer {
        Role::Admin => admin_ticket_path(ticket.id),
        Role::User => ticket_path(ticket.id),
    }
}

fn render_ticket_row(viewer: Role, ticket: &Ticket) -> String {
    let assignee = ticket.assigned_to_name.as_deref().unwrap_or("Unassigned");
    let requester_cell = match viewer {
        Role::Admin => format!("<td>{}</td>", html_escape(&ticket.created_by_name)),
        Role::User => String::new(),
    };
    format!(
        "<tr class=\"ticket-row\" data-id=\"{id}\">\
            <td class=\"ticket-subject\"><a href=\"{href}\">{subject}</a></td>\
            {requester}\
            <td>{department}</td>\
            <td>{status}</td>\
            <td>{priority}</td>\
            <td>{assignee}</td>\
            <td class=\"ticket-created\">{created}</td>\
        </tr>",
        id = ticket.id,
        href = ticket_link(viewer, ticket),
        subject = html_escape(&ticket.subject),
        requester = requester_cell,
        department = html_escape(&ticket.department),
        status = status_badge(ticket.status),
        priority = priority_badge(ticket.priority),
        assignee = html_escape(assignee),
        created = format_timestamp(&ticket.created_at),
    )
}

fn render_ticket_table(viewer: Role, tickets: &[Ticket]) -> String {
    let requester_header = match viewer {
        Role::Admin => "<th>Requester</th>",
        Role::User => "",
    };
    let rows: String = tickets.iter().map(|t| render_ticket_row(viewer, t)).collect();
    format!(
        "<table class=\"tickets-table\">\
            <thead><tr><th>Subject</th>{}<th>Department</th><th>Status</th><th>Priority</th><th>Assigned to</th><th>Created</th></tr></thead>\
            <tbody>{}</tbody>\
        </table>",
        requester_header, rows
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        html_escape(value),
        if selected { " selected" } else { "" },
        html_escape(label)
    )
}

fn render_filters(action: &str, filter: &TicketFilter, departments: &[String]) -> String {
    let statuses: String = std::iter::once(option("all", "All statuses", filter.status.is_none()))
        .chain(
            TicketStatus::ALL
                .iter()
                .map(|s| option(s.as_str(), s.label(), filter.status == Some(*s))),
        )
        .collect();
    let priorities: String =
        std::iter::once(option("all", "All priorities", filter.priority.is_none()))
            .chain(
                TicketPriority::ALL
                    .iter()
                    .map(|p| option(p.as_str(), p.label(), filter.priority == Some(*p))),
            )
            .collect();
    let department_options: String =
        std::iter::once(option("all", "All departments", filter.department.is_none()))
            .chain(departments.iter().map(|d| {
                option(d, d, filter.department.as_deref() == Some(d.as_str()))
            }))
            .collect();
    let sorts: String = TicketSort::ALL
        .iter()
        .map(|s| option(s.as_str(), s.label(), filter.sort == *s))
        .collect();

    format!(
        "<form class=\"filters\" method=\"get\" action=\"{action}\">\
            <input type=\"search\" name=\"q\" placeholder=\"Search subject or description\" value=\"{search}\">\
            <select name=\"status\">{statuses}</select>\
            <select name=\"priority\">{priorities}</select>\
            <select name=\"department\">{departments}</select>\
            <select name=\"sort\">{sorts}</select>\
            <button type=\"submit\" class=\"btn\">Apply</button>\
            <a href=\"{action}\" class=\"btn-link\">Reset</a>\
        </form>",
        action = action,
        search = html_escape(&filter.search),
        statuses = statuses,
        priorities = priorities,
        departments = department_options,
        sorts = sorts,
    )
}

fn render_list_screen(
    viewer: Role,
    action: &str,
    tickets: &[Ticket],
    query: &TicketListQuery,
) -> String {
    let filter = TicketFilter::from(query);
    let departments = department_options(tickets);
    let shown = filter.apply(tickets);

    let results = if tickets.is_empty() {
        match viewer {
            Role::User => format!(
                "{}<p class=\"center\"><a class=\"btn btn-primary\" href=\"{}\">Create a ticket</a></p>",
                render_empty_state("+", "No tickets yet", "Tickets you submit will show up here."),
                PageUrls::NEW_TICKET
            ),
            Role::Admin => render_empty_state("-", "No tickets yet", "Nobody has submitted a ticket."),
        }
    } else if shown.is_empty() {
        render_empty_state("?", "No matching tickets", "Try a different search or clear the filters.")
    } else {
        render_ticket_table(viewer, &shown)
    };

    format!(
        "{filters}<p class=\"muted\">Showing {shown} of {total} tickets</p>{results}",
        filters = render_filters(action, &filter, &departments),
        shown = shown.len(),
        total = tickets.len(),
        results = results,
    )
}

fn stat_card(label: &str, value: usize) -> String {
    format!(
        "<div class=\"card stat\"><span class=\"stat-value\">{}</span><span class=\"stat-label\">{}</span></div>",
        value,
        html_escape(label)
    )
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(flash): Query<Flash>,
) -> Response {
    let tickets = match state.tickets.list_for_user(user.user_id).await {
        Ok(tickets) => tickets,
        Err(e) => return failure_page(&user, "Dashboard", &e),
    };
    let stats = user_dashboard(&tickets);

    let recent = if stats.recent.is_empty() {
        render_empty_state("+", "No tickets yet", "Submit your first ticket to get help from IT.")
    } else {
        render_ticket_table(Role::User, &stats.recent)
    };
    let body = format!(
        "<div class=\"page-header\">\
            <h1>Welcome back, {name}</h1>\
            <a class=\"btn btn-primary\" href=\"{new_ticket}\">New ticket</a>\
        </div>\
        <div class=\"stats-grid\">{open}{progress}{resolved}</div>\
        <section class=\"card\">\
            <div class=\"section-header\"><h2>Recent tickets</h2><a href=\"{all}\">View all</a></div>\
            {recent}\
        </section>",
        name = html_escape(&user.name),
        new_ticket = PageUrls::NEW_TICKET,
        open = stat_card("Open", stats.open),
        progress = stat_card("In Progress", stats.in_progress),
        resolved = stat_card("Resolved", stats.resolved),
        all = PageUrls::MY_TICKETS,
        recent = recent,
    );
    render_page("Dashboard", Some(&user), &flash, &body).into_response()
}

pub async fn my_tickets_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TicketListQuery>,
    Query(flash): Query<Flash>,
) -> Response {
    let tickets = match state.tickets.list_for_user(user.user_id).await {
        Ok(tickets) => tickets,
        Err(e) => return failure_page(&user, "My tickets", &e),
    };
    let body = format!(
        "<div class=\"page-header\"><h1>My tickets</h1>\
            <a class=\"btn btn-primary\" href=\"{}\">New ticket</a></div>{}",
        PageUrls::NEW_TICKET,
        render_list_screen(Role::User, PageUrls::MY_TICKETS, &tickets, &query)
    );
    render_page("My tickets", Some(&user), &flash, &body).into_response()
}

fn render_new_ticket_form(departments: &[Department], max_upload_mb: usize) -> String {
    let department_options: String = std::iter::once(option("", "Select a department", true))
        .chain(
            departments
                .iter()
                .map(|d| option(&d.id.to_string(), &d.name, false)),
        )
        .collect();
    let priority_options: String = TicketPriority::ALL
        .iter()
        .map(|p| option(p.as_str(), p.label(), *p == TicketPriority::Medium))
        .collect();

    format!(
        "<form class=\"card stacked\" method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\
            <label>Subject<input type=\"text\" name=\"subject\" minlength=\"5\" maxlength=\"100\" required></label>\
            <label>Description<textarea name=\"description\" rows=\"6\" minlength=\"20\" required></textarea></label>\
            <div class=\"form-row\">\
                <label>Priority<select name=\"priority\">{priorities}</select></label>\
                <label>Department<select name=\"department_id\" required>{departments}</select></label>\
            </div>\
            <label>Attachment <span class=\"muted\">(JPEG, PNG, PDF or TXT, up to {max_mb}MB)</span>\
                <input type=\"file\" name=\"attachment\" accept=\".jpg,.jpeg,.png,.pdf,.txt\"></label>\
            <button type=\"submit\" class=\"btn btn-primary\">Submit ticket</button>\
        </form>",
        action = PageUrls::NEW_TICKET,
        priorities = priority_options,
        departments = department_options,
        max_mb = max_upload_mb,
    )
}

pub async fn new_ticket_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(flash): Query<Flash>,
) -> Response {
    let departments = match state.directory.list_departments().await {
        Ok(departments) => departments,
        Err(e) => return failure_page(&user, "New ticket", &e),
    };
    let body = format!(
        "<div class=\"page-header\"><h1>Submit a ticket</h1></div>{}",
        render_new_ticket_form(&departments, state.uploads.max_size / (1024 * 1024))
    );
    render_page("New ticket", Some(&user), &flash, &body).into_response()
}

async fn create_from_form(
    state: &AppState,
    user: &AuthenticatedUser,
    multipart: Multipart,
) -> Result<Ticket, StoreError> {
    let (form, attachment) = NewTicketForm::from_multipart(multipart, &state.uploads).await?;
    let new_ticket = form.validate(user.user_id, attachment)?;
    state.tickets.create(new_ticket).await
}

pub async fn submit_new_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Response {
    match create_from_form(&state, &user, multipart).await {
        Ok(ticket) => {
            info!("User {} created ticket {}", user.user_id, ticket.id);
            redirect_with_notice(&ticket_path(ticket.id), "Ticket submitted")
        }
        Err(e) => redirect_with_error(PageUrls::NEW_TICKET, &report("Failed to create ticket", &e)),
    }
}

fn render_comment(comment: &Comment) -> String {
    let (class, tag) = if comment.is_internal {
        (" comment-internal", "<span class=\"badge badge-warning\">Internal</span>")
    } else {
        ("", "")
    };
    format!(
        "<li class=\"comment{class}\">\
            <div class=\"comment-meta\"><strong>{author}</strong> {tag}<span class=\"muted\">{at}</span></div>\
            <p>{content}</p>\
        </li>",
        class = class,
        author = html_escape(&comment.user_name),
        tag = tag,
        at = format_timestamp(&comment.created_at),
        content = html_escape(&comment.content),
    )
}

fn render_attachment(attachment: &Attachment) -> String {
    format!(
        "<li><a href=\"{url}\" target=\"_blank\" rel=\"noopener\">{name}</a> <span class=\"muted\">{kb} KB · {kind}</span></li>",
        url = html_escape(&attachment.file_path),
        name = html_escape(&attachment.file_name),
        kb = (attachment.file_size + 1023) / 1024,
        kind = html_escape(&attachment.file_type),
    )
}

fn render_comment_form(action: &str, allow_internal: bool) -> String {
    let internal = if allow_internal {
        "<label class=\"checkbox\"><input type=\"checkbox\" name=\"is_internal\"> Internal note (hidden from the requester)</label>"
    } else {
        ""
    };
    format!(
        "<form class=\"stacked\" method=\"post\" action=\"{}\">\
            <label>Add a comment<textarea name=\"content\" rows=\"3\" required></textarea></label>\
            {}\
            <button type=\"submit\" class=\"btn\">Post comment</button>\
        </form>",
        action, internal
    )
}

fn render_ticket_detail(
    ticket: &Ticket,
    sidebar: &str,
    comment_action: &str,
    allow_internal: bool,
) -> String {
    let comments = if ticket.comments.is_empty() {
        "<p class=\"muted\">No comments yet.</p>".to_string()
    } else {
        format!(
            "<ul class=\"comments\">{}</ul>",
            ticket.comments.iter().map(render_comment).collect::<String>()
        )
    };
    let attachments = if ticket.attachments.is_empty() {
        String::new()
    } else {
        let items: String = ticket.attachments.iter().map(render_attachment).collect();
        format!("<section class=\"card\"><h2>Attachments</h2><ul class=\"attachments\">{}</ul></section>", items)
    };

    format!(
        "<div class=\"ticket-layout\">\
            <div class=\"ticket-main\">\
                <section class=\"card\">\
                    <div class=\"ticket-header\"><h1>{subject}</h1>{status}{priority}</div>\
                    <p class=\"muted\">Submitted by {requester} on {created} · {department}</p>\
                    <p class=\"ticket-description\">{description}</p>\
                </section>\
                {attachments}\
                <section class=\"card\">\
                    <h2>Conversation</h2>\
                    {comments}\
                    {comment_form}\
                </section>\
            </div>\
            <aside class=\"ticket-sidebar\">{sidebar}</aside>\
        </div>",
        subject = html_escape(&ticket.subject),
        status = status_badge(ticket.status),
        priority = priority_badge(ticket.priority),
        requester = html_escape(&ticket.created_by_name),
        created = format_timestamp(&ticket.created_at),
        department = html_escape(&ticket.department),
        description = html_escape(&ticket.description),
        attachments = attachments,
        comments = comments,
        comment_form = render_comment_form(comment_action, allow_internal),
        sidebar = sidebar,
    )
}

fn render_ticket_facts(ticket: &Ticket) -> String {
    format!(
        "<section class=\"card\">\
            <h3>Details</h3>\
            <dl>\
                <dt>Status</dt><dd>{status}</dd>\
                <dt>Priority</dt><dd>{priority}</dd>\
                <dt>Department</dt><dd>{department}</dd>\
                <dt>Assigned to</dt><dd>{assignee}</dd>\
                <dt>Last updated</dt><dd>{updated}</dd>\
            </dl>\
        </section>",
        status = status_badge(ticket.status),
        priority = priority_badge(ticket.priority),
        department = html_escape(&ticket.department),
        assignee = html_escape(ticket.assigned_to_name.as_deref().unwrap_or("Unassigned")),
        updated = format_timestamp(&ticket.updated_at),
    )
}

/// Loads a ticket for a screen, mapping access problems to the not-found page.
async fn ticket_for_screen(
    state: &AppState,
    user: &AuthenticatedUser,
    id: Uuid,
) -> Result<Ticket, Response> {
    match load_visible_ticket(state, user, id).await {
        Ok(ticket) => Ok(ticket),
        Err(StoreError::NotFound(_)) | Err(StoreError::Forbidden(_)) => Err(ticket_not_found_page(user)),
        Err(e) => Err(failure_page(user, "Ticket", &e)),
    }
}

pub async fn ticket_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(flash): Query<Flash>,
) -> Response {
    let ticket = match ticket_for_screen(&state, &user, id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };
    let back = format!(
        "<p><a href=\"{}\">&larr; Back to my tickets</a></p>",
        PageUrls::MY_TICKETS
    );
    let body = format!(
        "{}{}",
        back,
        render_ticket_detail(
            &ticket,
            &render_ticket_facts(&ticket),
            &format!("{}/comments", ticket_path(ticket.id)),
            user.is_admin(),
        )
    );
    render_page(&ticket.subject, Some(&user), &flash, &body).into_response()
}

async fn post_comment(
    state: &AppState,
    user: &AuthenticatedUser,
    id: Uuid,
    form: &CommentForm,
) -> Result<(), StoreError> {
    load_visible_ticket(state, user, id).await?;
    let is_internal = effective_internal_flag(user, form.internal_requested());
    state
        .tickets
        .add_comment(id, user.user_id, &form.content, is_internal)
        .await
        .map(|_| ())
}

pub async fn submit_ticket_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Form(form): Form<CommentForm>,
) -> Response {
    let back = ticket_path(id);
    match post_comment(&state, &user, id, &form).await {
        Ok(()) => redirect_with_notice(&back, "Comment added"),
        Err(StoreError::NotFound(_)) | Err(StoreError::Forbidden(_)) => ticket_not_found_page(&user),
        Err(e) => redirect_with_error(&back, &report("Failed to add comment", &e)),
    }
}

pub async fn admin_dashboard_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(flash): Query<Flash>,
) -> Response {
    let tickets = match state.tickets.list_all().await {
        Ok(tickets) => tickets,
        Err(e) => return failure_page(&user, "Admin dashboard", &e),
    };
    let stats = admin_dashboard(&tickets);

    let status_cards: String = stats
        .by_status
        .iter()
        .map(|entry| stat_card(&entry.label, entry.count))
        .collect();
    let breakdown = |entries: &[CountEntry]| -> String {
        if entries.is_empty() {
            return "<p class=\"muted\">No data yet.</p>".to_string();
        }
        let rows: String = entries
            .iter()
            .map(|e| format!("<li><span>{}</span><strong>{}</strong></li>", html_escape(&e.label), e.count))
            .collect();
        format!("<ul class=\"breakdown\">{}</ul>", rows)
    };
    let recent = if stats.recent_activity.is_empty() {
        render_empty_state("-", "No activity yet", "Updated tickets will appear here.")
    } else {
        render_ticket_table(Role::Admin, &stats.recent_activity)
    };

    let body = format!(
        "<div class=\"page-header\"><h1>Admin dashboard</h1>\
            <a class=\"btn\" href=\"{all}\">All tickets</a></div>\
        <div class=\"stats-grid\">{total}{unassigned}{status_cards}</div>\
        <div class=\"columns\">\
            <section class=\"card\"><h2>By priority</h2>{priority}</section>\
            <section class=\"card\"><h2>By department</h2>{department}</section>\
        </div>\
        <section class=\"card\"><h2>Recent activity</h2>{recent}</section>",
        all = PageUrls::ADMIN_TICKETS,
        total = stat_card("Total", stats.total),
        unassigned = stat_card("Unassigned", stats.unassigned),
        status_cards = status_cards,
        priority = breakdown(&stats.by_priority),
        department = breakdown(&stats.by_department),
        recent = recent,
    );
    render_page("Admin dashboard", Some(&user), &flash, &body).into_response()
}

pub async fn admin_tickets_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TicketListQuery>,
    Query(flash): Query<Flash>,
) -> Response {
    let tickets = match scoped_tickets(&state, &user).await {
        Ok(tickets) => tickets,
        Err(e) => return failure_page(&user, "All tickets", &e),
    };
    let body = format!(
        "<div class=\"page-header\"><h1>All tickets</h1></div>{}",
        render_list_screen(Role::Admin, PageUrls::ADMIN_TICKETS, &tickets, &query)
    );
    render_page("All tickets", Some(&user), &flash, &body).into_response()
}

fn render_admin_controls(ticket: &Ticket, assignees: &[User]) -> String {
    let statuses: String = TicketStatus::ALL
        .iter()
        .map(|s| option(s.as_str(), s.label(), ticket.status == *s))
        .collect();
    let people: String = std::iter::once(option("", "Select an admin", ticket.assigned_to.is_none()))
        .chain(assignees.iter().map(|a| {
            option(&a.id.to_string(), &a.name, ticket.assigned_to == Some(a.id))
        }))
        .collect();
    let path = admin_ticket_path(ticket.id);

    format!(
        "<section class=\"card\">\
            <h3>Status</h3>\
            <form class=\"inline\" method=\"post\" action=\"{path}/status\">\
                <select name=\"status\">{statuses}</select>\
                <button type=\"submit\" class=\"btn\">Update</button>\
            </form>\
        </section>\
        <section class=\"card\">\
            <h3>Assignment</h3>\
            <form class=\"inline\" method=\"post\" action=\"{path}/assign\">\
                <select name=\"assignee_id\" required>{people}</select>\
                <button type=\"submit\" class=\"btn\">Assign</button>\
            </form>\
            <p class=\"muted\">Assigning a ticket moves it to In Progress.</p>\
        </section>",
        path = path,
        statuses = statuses,
        people = people,
    )
}

pub async fn admin_ticket_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(flash): Query<Flash>,
) -> Response {
    let ticket = match ticket_for_screen(&state, &user, id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };
    let assignees = match state.directory.list_admins().await {
        Ok(admins) => admins,
        Err(e) => return failure_page(&user, "Ticket", &e),
    };
    let sidebar = format!(
        "{}{}",
        render_admin_controls(&ticket, &assignees),
        render_ticket_facts(&ticket)
    );
    let body = format!(
        "<p><a href=\"{}\">&larr; Back to all tickets</a></p>{}",
        PageUrls::ADMIN_TICKETS,
        render_ticket_detail(
            &ticket,
            &sidebar,
            &format!("{}/comments", admin_ticket_path(ticket.id)),
            true,
        )
    );
    render_page(&ticket.subject, Some(&user), &flash, &body).into_response()
}

/// Redirect back to the admin ticket screen after a form post. Only a
/// missing ticket sends the admin back to the list.
fn admin_outcome<T>(id: Uuid, result: Result<T, StoreError>, done: &str, context: &str) -> Response {
    let back = admin_ticket_path(id);
    match result {
        Ok(_) => redirect_with_notice(&back, done),
        Err(e) if is_missing_ticket(&e, id) => Redirect::to(PageUrls::ADMIN_TICKETS).into_response(),
        Err(e) => redirect_with_error(&back, &report(context, &e)),
    }
}

fn is_missing_ticket(e: &StoreError, id: Uuid) -> bool {
    matches!(
        (e, ticket_not_found(id)),
        (StoreError::NotFound(found), StoreError::NotFound(expected)) if *found == expected
    )
}

pub async fn submit_admin_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Form(form): Form<StatusForm>,
) -> Response {
    let result = match form.parse() {
        Ok(status) => {
            let updated = state.tickets.update_status(id, status).await;
            if updated.is_ok() {
                info!("Admin {} set ticket {} to {}", user.user_id, id, status);
            }
            updated
        }
        Err(e) => Err(e),
    };
    admin_outcome(id, result, "Status updated", "Failed to update status")
}

pub async fn submit_admin_assign(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Form(form): Form<AssignForm>,
) -> Response {
    let result = match form.parse() {
        Ok(assignee) => {
            let updated = state.tickets.assign(id, assignee).await;
            if updated.is_ok() {
                info!("Admin {} assigned ticket {} to {}", user.user_id, id, assignee);
            }
            updated
        }
        Err(e) => Err(e),
    };
    admin_outcome(id, result, "Ticket assigned", "Failed to assign ticket")
}

pub async fn submit_admin_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Form(form): Form<CommentForm>,
) -> Response {
    let result = post_comment(&state, &user, id, &form).await;
    admin_outcome(id, result, "Comment added", "Failed to add comment")
}
