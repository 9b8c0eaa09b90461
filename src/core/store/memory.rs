//! In-process backend. All tables live behind one `RwLock` owned by the
//! backend instance, so separate instances never share data.

use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, DEFAULT_DEPARTMENTS};
use crate::core::shared::enums::{Role, TicketStatus};
use crate::core::shared::models::{
    Attachment, AttachmentRow, Comment, CommentRow, Department, ProfileRow, Ticket, TicketRow, User,
};
use crate::core::shared::utils::{next_update_timestamp, normalize_email, now_micros};
use crate::directory::{email_taken, user_not_found, Credentials, DirectoryRepository, NewProfile};
use crate::drive::ObjectStore;
use crate::tickets::repository::{
    check_assignee, check_comment_content, ticket_not_found, NewTicket, TicketRepository,
};

#[derive(Debug, Default)]
struct Tables {
    departments: Vec<Department>,
    profiles: Vec<ProfileRow>,
    tickets: Vec<TicketRow>,
    comments: Vec<CommentRow>,
    attachments: Vec<AttachmentRow>,
}

impl Tables {
    fn department_name(&self, id: Option<Uuid>) -> Option<String> {
        let id = id?;
        self.departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
    }

    fn profile(&self, id: Uuid) -> Option<&ProfileRow> {
        self.profiles.iter().find(|p| p.id == id)
    }

    fn profile_name(&self, id: Uuid) -> String {
        self.profile(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown user".to_string())
    }

    fn user(&self, row: &ProfileRow) -> User {
        User::from_row(row.clone(), self.department_name(row.department_id))
    }

    fn ticket_summary(&self, row: &TicketRow) -> Ticket {
        Ticket::from_row(
            row.clone(),
            self.department_name(Some(row.department_id))
                .unwrap_or_default(),
            self.profile_name(row.created_by),
            row.assigned_to.map(|id| self.profile_name(id)),
        )
    }

    fn ticket_full(&self, row: &TicketRow) -> Ticket {
        let mut ticket = self.ticket_summary(row);
        let mut comments: Vec<&CommentRow> = self
            .comments
            .iter()
            .filter(|c| c.ticket_id == row.id)
            .collect();
        comments.sort_by_key(|c| c.created_at);
        ticket.comments = comments
            .into_iter()
            .map(|c| Comment::from_row(c.clone(), self.profile_name(c.user_id)))
            .collect();
        ticket.attachments = self
            .attachments
            .iter()
            .filter(|a| a.ticket_id == row.id)
            .cloned()
            .map(Attachment::from)
            .collect();
        ticket
    }

    /// Newest first; later inserts win ties.
    fn newest_first<'a>(&self, rows: impl DoubleEndedIterator<Item = &'a TicketRow>) -> Vec<Ticket> {
        let mut rows: Vec<&TicketRow> = rows.rev().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().map(|row| self.ticket_summary(row)).collect()
    }

    fn ticket_mut(&mut self, id: Uuid) -> Result<&mut TicketRow, StoreError> {
        self.tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ticket_not_found(id))
    }
}

pub struct MemoryBackend {
    tables: RwLock<Tables>,
    storage: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("storage", &"Arc<dyn ObjectStore>")
            .finish_non_exhaustive()
    }
}

impl MemoryBackend {
    /// Empty store seeded with the default departments.
    pub fn new(storage: Arc<dyn ObjectStore>) -> Self {
        let departments = DEFAULT_DEPARTMENTS
            .iter()
            .map(|(name, description)| Department {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                description: Some((*description).to_string()),
            })
            .collect();
        info!("Using in-memory helpdesk store");
        Self {
            tables: RwLock::new(Tables {
                departments,
                ..Tables::default()
            }),
            storage,
        }
    }

    /// Changes a profile's role. There is no HTTP route for this; it exists
    /// for seeding and tests.
    pub async fn set_role(&self, user_id: Uuid, role: Role) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        row.role = role;
        row.updated_at = next_update_timestamp(row.updated_at);
        let row = row.clone();
        Ok(tables.user(&row))
    }
}

#[async_trait]
impl TicketRepository for MemoryBackend {
    async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(tables.tickets.iter()))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(tables.tickets.iter().filter(|t| t.created_by == user_id)))
    }

    async fn get_by_id(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .iter()
            .find(|t| t.id == ticket_id)
            .map(|row| tables.ticket_full(row)))
    }

    async fn create(&self, new_ticket: NewTicket) -> Result<Ticket, StoreError> {
        new_ticket.check_required()?;
        {
            let tables = self.tables.read().await;
            if tables.department_name(Some(new_ticket.department_id)).is_none() {
                return Err(StoreError::Validation("Unknown department".to_string()));
            }
            if tables.profile(new_ticket.created_by).is_none() {
                return Err(user_not_found(new_ticket.created_by));
            }
        }

        let ticket_id = Uuid::new_v4();
        let now = now_micros();

        let attachment = match &new_ticket.attachment {
            Some(file) => {
                let key = file.storage_key(ticket_id);
                self.storage
                    .put(&key, file.data.clone(), &file.content_type)
                    .await?;
                Some(AttachmentRow {
                    id: Uuid::new_v4(),
                    ticket_id,
                    file_name: file.file_name.clone(),
                    file_path: self.storage.public_url(&key),
                    file_size: file.size(),
                    file_type: file.content_type.clone(),
                    uploaded_by: new_ticket.created_by,
                    uploaded_at: now,
                })
            }
            None => None,
        };

        let row = TicketRow {
            id: ticket_id,
            subject: new_ticket.subject.trim().to_string(),
            description: new_ticket.description.trim().to_string(),
            priority: new_ticket.priority,
            status: TicketStatus::Open,
            department_id: new_ticket.department_id,
            created_by: new_ticket.created_by,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.tickets.push(row.clone());
        if let Some(attachment) = attachment {
            tables.attachments.push(attachment);
        }
        debug!("Created ticket {}", ticket_id);
        Ok(tables.ticket_full(&row))
    }

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables.ticket_mut(ticket_id)?;
        row.status = status;
        row.updated_at = next_update_timestamp(row.updated_at);
        let row = row.clone();
        Ok(tables.ticket_full(&row))
    }

    async fn assign(&self, ticket_id: Uuid, assignee_id: Uuid) -> Result<Ticket, StoreError> {
        let mut tables = self.tables.write().await;
        check_assignee(assignee_id, tables.profile(assignee_id).map(|p| p.role))?;
        let row = tables.ticket_mut(ticket_id)?;
        row.assigned_to = Some(assignee_id);
        row.status = TicketStatus::InProgress;
        row.updated_at = next_update_timestamp(row.updated_at);
        let row = row.clone();
        Ok(tables.ticket_full(&row))
    }

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        author_id: Uuid,
        content: &str,
        is_internal: bool,
    ) -> Result<Comment, StoreError> {
        check_comment_content(content)?;
        let mut tables = self.tables.write().await;
        let user_name = tables
            .profile(author_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| user_not_found(author_id))?;

        let ticket = tables.ticket_mut(ticket_id)?;
        let bumped = next_update_timestamp(ticket.updated_at);
        ticket.updated_at = bumped;

        let comment = CommentRow {
            id: Uuid::new_v4(),
            ticket_id,
            user_id: author_id,
            content: content.trim().to_string(),
            is_internal,
            created_at: bumped,
        };
        tables.comments.push(comment.clone());
        Ok(Comment::from_row(comment, user_name))
    }
}

#[async_trait]
impl DirectoryRepository for MemoryBackend {
    async fn create_user(&self, profile: NewProfile) -> Result<User, StoreError> {
        let email = normalize_email(&profile.email);
        let mut tables = self.tables.write().await;
        if tables.profiles.iter().any(|p| p.email == email) {
            return Err(email_taken());
        }
        if profile.department_id.is_some() && tables.department_name(profile.department_id).is_none()
        {
            return Err(StoreError::Validation("Unknown department".to_string()));
        }
        let now = now_micros();
        let row = ProfileRow {
            id: Uuid::new_v4(),
            name: profile.name.trim().to_string(),
            email,
            role: profile.role,
            department_id: profile.department_id,
            password_hash: profile.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(row.clone());
        Ok(tables.user(&row))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_credentials(email).await?.map(|c| c.user))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.email == email)
            .map(|row| Credentials {
                user: tables.user(row),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.profile(user_id).map(|row| tables.user(row)))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: &str,
        department_id: Option<Uuid>,
    ) -> Result<User, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation("Name is required".to_string()));
        }
        let mut tables = self.tables.write().await;
        if department_id.is_some() && tables.department_name(department_id).is_none() {
            return Err(StoreError::Validation("Unknown department".to_string()));
        }
        let row = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        row.name = name.trim().to_string();
        row.department_id = department_id;
        row.updated_at = next_update_timestamp(row.updated_at);
        let row = row.clone();
        Ok(tables.user(&row))
    }

    async fn list_admins(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        let mut admins: Vec<User> = tables
            .profiles
            .iter()
            .filter(|p| p.role == Role::Admin)
            .map(|row| tables.user(row))
            .collect();
        admins.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(admins)
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let tables = self.tables.read().await;
        let mut departments = tables.departments.clone();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }
}
