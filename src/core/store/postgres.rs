use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::StoreError;
use crate::core::shared::enums::{Role, TicketStatus};
use crate::core::shared::models::{
    Attachment, AttachmentRow, Comment, CommentRow, Department, ProfileRow, Ticket, TicketRow, User,
};
use crate::core::shared::schema::{attachments, comments, departments, profiles, tickets};
use crate::core::shared::utils::{next_update_timestamp, normalize_email, now_micros, DbPool};
use crate::directory::{email_taken, user_not_found, Credentials, DirectoryRepository, NewProfile};
use crate::drive::ObjectStore;
use crate::tickets::repository::{
    check_assignee, check_comment_content, ticket_not_found, NewTicket, TicketRepository,
};

/// Diesel-backed store. Every call checks a connection out of the pool on a
/// blocking thread.
pub struct PgBackend {
    pool: DbPool,
    storage: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for PgBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgBackend")
            .field("pool_state", &self.pool.state())
            .finish_non_exhaustive()
    }
}

impl PgBackend {
    pub fn new(pool: DbPool, storage: Arc<dyn ObjectStore>) -> Self {
        info!("Using Postgres helpdesk store");
        Self { pool, storage }
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut db_conn = pool.get()?;
            f(&mut db_conn)
        })
        .await?
    }
}

fn profile_names(
    conn: &mut PgConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, String>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let names: Vec<(Uuid, String)> = profiles::table
        .filter(profiles::id.eq_any(ids))
        .select((profiles::id, profiles::name))
        .load(conn)?;
    Ok(names.into_iter().collect())
}

fn hydrate(rows: Vec<(TicketRow, String)>, names: &HashMap<Uuid, String>) -> Vec<Ticket> {
    let name_of = |id: Uuid| {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "Unknown user".to_string())
    };
    rows.into_iter()
        .map(|(row, department)| {
            let created_by_name = name_of(row.created_by);
            let assigned_to_name = row.assigned_to.map(name_of);
            Ticket::from_row(row, department, created_by_name, assigned_to_name)
        })
        .collect()
}

fn load_summaries(
    conn: &mut PgConnection,
    creator: Option<Uuid>,
) -> Result<Vec<Ticket>, StoreError> {
    let mut query = tickets::table
        .inner_join(departments::table)
        .select((TicketRow::as_select(), departments::name))
        .order(tickets::created_at.desc())
        .into_boxed();
    if let Some(user_id) = creator {
        query = query.filter(tickets::created_by.eq(user_id));
    }
    let rows: Vec<(TicketRow, String)> = query.load(conn)?;

    let mut people: Vec<Uuid> = rows
        .iter()
        .flat_map(|(row, _)| std::iter::once(row.created_by).chain(row.assigned_to))
        .collect();
    people.sort();
    people.dedup();
    let names = profile_names(conn, people)?;
    Ok(hydrate(rows, &names))
}

fn load_ticket(conn: &mut PgConnection, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
    let found: Option<(TicketRow, String)> = tickets::table
        .inner_join(departments::table)
        .filter(tickets::id.eq(ticket_id))
        .select((TicketRow::as_select(), departments::name))
        .first(conn)
        .optional()?;
    let Some((row, department)) = found else {
        return Ok(None);
    };

    let people: Vec<Uuid> = std::iter::once(row.created_by)
        .chain(row.assigned_to)
        .collect();
    let names = profile_names(conn, people)?;
    let mut ticket = hydrate(vec![(row, department)], &names)
        .pop()
        .ok_or_else(|| StoreError::Internal("ticket hydration produced no row".to_string()))?;

    let comment_rows: Vec<(CommentRow, String)> = comments::table
        .inner_join(profiles::table)
        .filter(comments::ticket_id.eq(ticket_id))
        .order(comments::created_at.asc())
        .select((CommentRow::as_select(), profiles::name))
        .load(conn)?;
    ticket.comments = comment_rows
        .into_iter()
        .map(|(row, user_name)| Comment::from_row(row, user_name))
        .collect();

    let attachment_rows: Vec<AttachmentRow> = attachments::table
        .filter(attachments::ticket_id.eq(ticket_id))
        .order(attachments::uploaded_at.asc())
        .select(AttachmentRow::as_select())
        .load(conn)?;
    ticket.attachments = attachment_rows.into_iter().map(Attachment::from).collect();

    Ok(Some(ticket))
}

fn current_updated_at(
    conn: &mut PgConnection,
    ticket_id: Uuid,
) -> Result<DateTime<Utc>, StoreError> {
    tickets::table
        .find(ticket_id)
        .select(tickets::updated_at)
        .first::<DateTime<Utc>>(conn)
        .optional()?
        .ok_or_else(|| ticket_not_found(ticket_id))
}

fn require_ticket(conn: &mut PgConnection, ticket_id: Uuid) -> Result<Ticket, StoreError> {
    load_ticket(conn, ticket_id)?.ok_or_else(|| ticket_not_found(ticket_id))
}

fn load_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, StoreError> {
    let found: Option<(ProfileRow, Option<String>)> = profiles::table
        .left_join(departments::table)
        .filter(profiles::id.eq(user_id))
        .select((ProfileRow::as_select(), departments::name.nullable()))
        .first(conn)
        .optional()?;
    Ok(found.map(|(row, department)| User::from_row(row, department)))
}

#[async_trait]
impl TicketRepository for PgBackend {
    async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
        self.run(|conn| load_summaries(conn, None)).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        self.run(move |conn| load_summaries(conn, Some(user_id))).await
    }

    async fn get_by_id(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        self.run(move |conn| load_ticket(conn, ticket_id)).await
    }

    async fn create(&self, new_ticket: NewTicket) -> Result<Ticket, StoreError> {
        new_ticket.check_required()?;

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

        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                diesel::insert_into(tickets::table)
                    .values(&row)
                    .execute(conn)?;
                if let Some(attachment) = &attachment {
                    diesel::insert_into(attachments::table)
                        .values(attachment)
                        .execute(conn)?;
                }
                debug!("Created ticket {}", row.id);
                require_ticket(conn, row.id)
            })
        })
        .await
    }

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, StoreError> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let bumped = next_update_timestamp(current_updated_at(conn, ticket_id)?);
                diesel::update(tickets::table.find(ticket_id))
                    .set((tickets::status.eq(status), tickets::updated_at.eq(bumped)))
                    .execute(conn)?;
                require_ticket(conn, ticket_id)
            })
        })
        .await
    }

    async fn assign(&self, ticket_id: Uuid, assignee_id: Uuid) -> Result<Ticket, StoreError> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let bumped = next_update_timestamp(current_updated_at(conn, ticket_id)?);
                let assignee_role: Option<Role> = profiles::table
                    .find(assignee_id)
                    .select(profiles::role)
                    .first(conn)
                    .optional()?;
                check_assignee(assignee_id, assignee_role)?;
                diesel::update(tickets::table.find(ticket_id))
                    .set((
                        tickets::assigned_to.eq(Some(assignee_id)),
                        tickets::status.eq(TicketStatus::InProgress),
                        tickets::updated_at.eq(bumped),
                    ))
                    .execute(conn)?;
                require_ticket(conn, ticket_id)
            })
        })
        .await
    }

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        author_id: Uuid,
        content: &str,
        is_internal: bool,
    ) -> Result<Comment, StoreError> {
        check_comment_content(content)?;
        let content = content.trim().to_string();

        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let bumped = next_update_timestamp(current_updated_at(conn, ticket_id)?);
                let user_name: String = profiles::table
                    .find(author_id)
                    .select(profiles::name)
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| user_not_found(author_id))?;

                let row = CommentRow {
                    id: Uuid::new_v4(),
                    ticket_id,
                    user_id: author_id,
                    content,
                    is_internal,
                    created_at: bumped,
                };
                diesel::insert_into(comments::table)
                    .values(&row)
                    .execute(conn)?;
                diesel::update(tickets::table.find(ticket_id))
                    .set(tickets::updated_at.eq(bumped))
                    .execute(conn)?;
                Ok(Comment::from_row(row, user_name))
            })
        })
        .await
    }
}

#[async_trait]
impl DirectoryRepository for PgBackend {
    async fn create_user(&self, profile: NewProfile) -> Result<User, StoreError> {
        let now = now_micros();
        let row = ProfileRow {
            id: Uuid::new_v4(),
            name: profile.name.trim().to_string(),
            email: normalize_email(&profile.email),
            role: profile.role,
            department_id: profile.department_id,
            password_hash: profile.password_hash,
            created_at: now,
            updated_at: now,
        };

        self.run(move |conn| {
            let taken: Option<Uuid> = profiles::table
                .filter(profiles::email.eq(&row.email))
                .select(profiles::id)
                .first(conn)
                .optional()?;
            if taken.is_some() {
                return Err(email_taken());
            }
            match diesel::insert_into(profiles::table).values(&row).execute(conn) {
                Ok(_) => {}
                Err(e) => {
                    return Err(match StoreError::from(e) {
                        StoreError::Conflict(_) => email_taken(),
                        other => other,
                    })
                }
            }
            load_user(conn, row.id)?.ok_or_else(|| user_not_found(row.id))
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_credentials(email).await?.map(|c| c.user))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let email = normalize_email(email);
        self.run(move |conn| {
            let found: Option<(ProfileRow, Option<String>)> = profiles::table
                .left_join(departments::table)
                .filter(profiles::email.eq(email))
                .select((ProfileRow::as_select(), departments::name.nullable()))
                .first(conn)
                .optional()?;
            Ok(found.map(|(row, department)| {
                let password_hash = row.password_hash.clone();
                Credentials {
                    user: User::from_row(row, department),
                    password_hash,
                }
            }))
        })
        .await
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        self.run(move |conn| load_user(conn, user_id)).await
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
        let name = name.trim().to_string();
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let previous: DateTime<Utc> = profiles::table
                    .find(user_id)
                    .select(profiles::updated_at)
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| user_not_found(user_id))?;
                diesel::update(profiles::table.find(user_id))
                    .set((
                        profiles::name.eq(&name),
                        profiles::department_id.eq(department_id),
                        profiles::updated_at.eq(next_update_timestamp(previous)),
                    ))
                    .execute(conn)?;
                load_user(conn, user_id)?.ok_or_else(|| user_not_found(user_id))
            })
        })
        .await
    }

    async fn list_admins(&self) -> Result<Vec<User>, StoreError> {
        self.run(|conn| {
            let rows: Vec<(ProfileRow, Option<String>)> = profiles::table
                .left_join(departments::table)
                .filter(profiles::role.eq(Role::Admin))
                .order(profiles::name.asc())
                .select((ProfileRow::as_select(), departments::name.nullable()))
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(row, department)| User::from_row(row, department))
                .collect())
        })
        .await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        self.run(|conn| {
            let rows = departments::table
                .order(departments::name.asc())
                .select(Department::as_select())
                .load(conn)?;
            Ok(rows)
        })
        .await
    }
}
