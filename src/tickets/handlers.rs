//! JSON API over the ticket repository.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::core::shared::enums::Role;
use crate::core::shared::models::{Comment, Ticket, User};
use crate::core::shared::state::AppState;
use crate::core::store::StoreError;
use crate::security::auth_api::AuthenticatedUser;
use crate::tickets::filter::{department_options, TicketFilter, TicketListQuery};
use crate::tickets::forms::{AssignForm, CommentRequest, NewTicketForm, StatusForm};
use crate::tickets::repository::ticket_not_found;
use crate::tickets::stats::{admin_dashboard, AdminDashboardStats};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListResponse {
    pub tickets: Vec<Ticket>,
    pub total: usize,
    pub departments: Vec<String>,
}

/// The viewer's list: own tickets for users, everything for admins.
pub async fn scoped_tickets(state: &AppState, viewer: &AuthenticatedUser) -> Result<Vec<Ticket>, StoreError> {
    match viewer.role {
        Role::Admin => state.tickets.list_all().await,
        Role::User => state.tickets.list_for_user(viewer.user_id).await,
    }
}

/// Loads a ticket the viewer may see, with internal notes stripped for users.
/// Tickets owned by someone else are reported as forbidden.
pub async fn load_visible_ticket(
    state: &AppState,
    viewer: &AuthenticatedUser,
    ticket_id: Uuid,
) -> Result<Ticket, StoreError> {
    let ticket = state
        .tickets
        .get_by_id(ticket_id)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;
    if !viewer.can_view_ticket(&ticket) {
        return Err(StoreError::Forbidden(
            "You do not have access to this ticket".to_string(),
        ));
    }
    Ok(ticket.visible_to(viewer.role))
}

/// Users can never post internal notes, whatever the request says.
pub fn effective_internal_flag(viewer: &AuthenticatedUser, requested: bool) -> bool {
    match viewer.role {
        Role::Admin => requested,
        Role::User => false,
    }
}

pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<TicketListResponse>, StoreError> {
    let tickets = scoped_tickets(&state, &user).await?;
    let departments = department_options(&tickets);
    let tickets = TicketFilter::from(&query).apply(&tickets);
    Ok(Json(TicketListResponse {
        total: tickets.len(),
        tickets,
        departments,
    }))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Ticket>), StoreError> {
    let (form, attachment) = NewTicketForm::from_multipart(multipart, &state.uploads).await?;
    let new_ticket = form.validate(user.user_id, attachment)?;
    let ticket = state.tickets.create(new_ticket).await?;
    info!("User {} created ticket {}", user.user_id, ticket.id);
    Ok((StatusCode::CREATED, Json(ticket.visible_to(user.role))))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, StoreError> {
    load_visible_ticket(&state, &user, id).await.map(Json)
}

pub async fn change_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusForm>,
) -> Result<Json<Ticket>, StoreError> {
    let status = req.parse()?;
    let ticket = state.tickets.update_status(id, status).await?;
    info!("Admin {} set ticket {} to {}", user.user_id, id, status);
    Ok(Json(ticket))
}

pub async fn assign_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignForm>,
) -> Result<Json<Ticket>, StoreError> {
    let assignee = req.parse()?;
    let ticket = state.tickets.assign(id, assignee).await?;
    info!("Admin {} assigned ticket {} to {}", user.user_id, id, assignee);
    Ok(Json(ticket))
}

pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), StoreError> {
    load_visible_ticket(&state, &user, id).await?;
    let is_internal = effective_internal_flag(&user, req.is_internal);
    let comment = state
        .tickets
        .add_comment(id, user.user_id, &req.content, is_internal)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminDashboardStats>, StoreError> {
    let tickets = state.tickets.list_all().await?;
    Ok(Json(admin_dashboard(&tickets)))
}

pub async fn list_assignees(State(state): State<AppState>) -> Result<Json<Vec<User>>, StoreError> {
    state.directory.list_admins().await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::TestHarness;
    use crate::core::shared::enums::TicketPriority;
    use crate::tickets::repository::NewTicket;

    async fn seed_ticket(harness: &TestHarness, owner: &AuthenticatedUser) -> Ticket {
        let department_id = harness.department_id("IT").await;
        harness
            .state
            .tickets
            .create(NewTicket {
                subject: "Laptop will not boot".to_string(),
                description: "Black screen after the BIOS logo appears".to_string(),
                priority: TicketPriority::Medium,
                department_id,
                created_by: owner.user_id,
                attachment: None,
            })
            .await
            .expect("create ticket")
    }

    #[tokio::test]
    async fn test_users_only_see_their_own_tickets() {
        let harness = TestHarness::new();
        let alice = harness.session_for("Alice", "alice@example.com", Role::User).await;
        let bob = harness.session_for("Bob", "bob@example.com", Role::User).await;
        let admin = harness.session_for("Ada", "ada@example.com", Role::Admin).await;
        let ticket = seed_ticket(&harness, &alice).await;

        assert_eq!(scoped_tickets(&harness.state, &alice).await.expect("list").len(), 1);
        assert!(scoped_tickets(&harness.state, &bob).await.expect("list").is_empty());
        assert_eq!(scoped_tickets(&harness.state, &admin).await.expect("list").len(), 1);

        let denied = load_visible_ticket(&harness.state, &bob, ticket.id).await;
        assert!(matches!(denied, Err(StoreError::Forbidden(_))));
        assert!(load_visible_ticket(&harness.state, &admin, ticket.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_internal_notes_hidden_from_owner() {
        let harness = TestHarness::new();
        let alice = harness.session_for("Alice", "alice@example.com", Role::User).await;
        let admin = harness.session_for("Ada", "ada@example.com", Role::Admin).await;
        let ticket = seed_ticket(&harness, &alice).await;

        harness
            .state
            .tickets
            .add_comment(ticket.id, admin.user_id, "Probably the SSD", true)
            .await
            .expect("internal note");
        harness
            .state
            .tickets
            .add_comment(ticket.id, admin.user_id, "We are looking into it", false)
            .await
            .expect("public reply");

        let seen_by_owner = load_visible_ticket(&harness.state, &alice, ticket.id).await.expect("owner view");
        assert_eq!(seen_by_owner.comments.len(), 1);
        assert!(!seen_by_owner.comments[0].is_internal);

        let seen_by_admin = load_visible_ticket(&harness.state, &admin, ticket.id).await.expect("admin view");
        assert_eq!(seen_by_admin.comments.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_ticket_is_not_found() {
        let harness = TestHarness::new();
        let admin = harness.session_for("Ada", "ada@example.com", Role::Admin).await;
        let result = load_visible_ticket(&harness.state, &admin, Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_users_cannot_post_internal_notes() {
        let user = AuthenticatedUser::new(Uuid::new_v4(), "Alice".to_string());
        let admin = user.clone().with_role(Role::Admin);
        assert!(!effective_internal_flag(&user, true));
        assert!(effective_internal_flag(&admin, true));
        assert!(!effective_internal_flag(&admin, false));
    }
}
