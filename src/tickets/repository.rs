use async_trait::async_trait;
use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::core::shared::enums::{Role, TicketPriority, TicketStatus};
use crate::core::shared::models::{Comment, Ticket};
use crate::core::store::StoreError;

/// A file received with the new-ticket form, already validated.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }

    /// Object key for this file under `ticket_id`: `<ticket-id>/<random>.<ext>`.
    pub fn storage_key(&self, ticket_id: Uuid) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        match self.extension() {
            Some(ext) => format!("{}/{}.{}", ticket_id, random, ext),
            None => format!("{}/{}", ticket_id, random),
        }
    }

    fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub department_id: Uuid,
    pub created_by: Uuid,
    pub attachment: Option<UploadedFile>,
}

impl NewTicket {
    /// Required-field check shared by every backend.
    pub fn check_required(&self) -> Result<(), StoreError> {
        if self.subject.trim().is_empty() {
            return Err(StoreError::Validation("Subject is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(StoreError::Validation("Description is required".to_string()));
        }
        if self.department_id.is_nil() {
            return Err(StoreError::Validation("Department is required".to_string()));
        }
        if self.created_by.is_nil() {
            return Err(StoreError::Validation("Ticket creator is required".to_string()));
        }
        Ok(())
    }
}

pub fn check_comment_content(content: &str) -> Result<(), StoreError> {
    if content.trim().is_empty() {
        return Err(StoreError::Validation("Comment cannot be empty".to_string()));
    }
    Ok(())
}

/// Tickets go to admins only. `role` is the assignee's stored role, if the
/// profile exists.
pub fn check_assignee(assignee_id: Uuid, role: Option<Role>) -> Result<(), StoreError> {
    match role {
        Some(Role::Admin) => Ok(()),
        Some(Role::User) => Err(StoreError::Validation(
            "Tickets can only be assigned to admins".to_string(),
        )),
        None => Err(StoreError::Validation(format!(
            "Assignee {} not found",
            assignee_id
        ))),
    }
}

pub fn ticket_not_found(ticket_id: Uuid) -> StoreError {
    StoreError::NotFound(format!("Ticket {} not found", ticket_id))
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Every ticket, newest first. Comments and attachments are not loaded.
    async fn list_all(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Tickets created by `user_id`, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError>;

    /// One ticket with comments (oldest first) and attachments.
    async fn get_by_id(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    /// Stores a new ticket with status `open`. Any attachment is uploaded
    /// before the ticket row is written.
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, StoreError>;

    /// Sets the assignee and moves the ticket to `in-progress`. The assignee
    /// must be an existing admin; `NotFound` always means the ticket.
    async fn assign(&self, ticket_id: Uuid, assignee_id: Uuid) -> Result<Ticket, StoreError>;

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        author_id: Uuid,
        content: &str,
        is_internal: bool,
    ) -> Result<Comment, StoreError>;
}
