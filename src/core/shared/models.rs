use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use super::schema;

use super::enums::{Role, TicketPriority, TicketStatus};
use super::schema::{attachments, comments, departments, profiles, tickets};

// ============================================================================
// STORED ROWS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = departments)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A registered account. The password hash never leaves the directory layer.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = profiles)]
pub struct ProfileRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = tickets)]
pub struct TicketRow {
    pub id: Uuid,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub department_id: Uuid,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = comments)]
pub struct CommentRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = attachments)]
pub struct AttachmentRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

// ============================================================================
// VIEW MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_row(row: ProfileRow, department: Option<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            department_id: row.department_id,
            department,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::User => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub content: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn from_row(row: CommentRow, user_name: String) -> Self {
        Self {
            id: row.id,
            ticket_id: row.ticket_id,
            user_id: row.user_id,
            user_name,
            content: row.content,
            is_internal: row.is_internal,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl From<AttachmentRow> for Attachment {
    fn from(row: AttachmentRow) -> Self {
        Self {
            id: row.id,
            ticket_id: row.ticket_id,
            file_name: row.file_name,
            file_path: row.file_path,
            file_size: row.file_size,
            file_type: row.file_type,
            uploaded_by: row.uploaded_by,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// A ticket with department and people names resolved.
///
/// List queries leave `comments` and `attachments` empty; only the
/// single-ticket fetch loads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub department_id: Uuid,
    pub department: String,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

impl Ticket {
    pub fn from_row(
        row: TicketRow,
        department: String,
        created_by_name: String,
        assigned_to_name: Option<String>,
    ) -> Self {
        Self {
            id: row.id,
            subject: row.subject,
            description: row.description,
            priority: row.priority,
            status: row.status,
            department_id: row.department_id,
            department,
            created_by: row.created_by,
            created_by_name,
            assigned_to: row.assigned_to,
            assigned_to_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            comments: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Strips internal notes unless the viewer is an admin.
    pub fn visible_to(mut self, viewer_role: Role) -> Self {
        match viewer_role {
            Role::Admin => self,
            Role::User => {
                self.comments.retain(|c| !c.is_internal);
                self
            }
        }
    }
}
