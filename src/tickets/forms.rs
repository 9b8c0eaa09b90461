//! Ticket form input: parsing, field rules, and the optional attachment.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use log::debug;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::shared::enums::{TicketPriority, TicketStatus};
use crate::core::store::StoreError;
use crate::security::file_validation::{
    size_limit_message, validate_file_upload, FileValidationConfig,
};
use crate::tickets::repository::{NewTicket, UploadedFile};

pub const SUBJECT_MIN: usize = 5;
pub const SUBJECT_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 20;

/// Field name of the file input on the new-ticket form.
pub const ATTACHMENT_FIELD: &str = "attachment";

/// Room for the text fields and multipart framing around the attachment.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Body cap for the new-ticket routes. An attachment just over the file
/// limit still arrives whole, so the upload rules report it.
pub fn upload_body_limit(uploads: &FileValidationConfig) -> usize {
    uploads.max_size.saturating_add(FORM_OVERHEAD_BYTES)
}

fn read_failure(e: MultipartError, uploads: &FileValidationConfig, what: &str) -> StoreError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return invalid(size_limit_message(uploads.max_size));
    }
    invalid(format!("{what}: {}", e.body_text()))
}

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Validation(message.into())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTicketForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, alias = "departmentId")]
    pub department_id: String,
}

impl NewTicketForm {
    /// Applies the form rules and produces the repository input.
    pub fn validate(
        &self,
        created_by: Uuid,
        attachment: Option<UploadedFile>,
    ) -> Result<NewTicket, StoreError> {
        let subject = self.subject.trim();
        let description = self.description.trim();
        let subject_len = subject.chars().count();

        if subject_len < SUBJECT_MIN {
            return Err(invalid(format!(
                "Subject must be at least {SUBJECT_MIN} characters"
            )));
        }
        if subject_len > SUBJECT_MAX {
            return Err(invalid(format!(
                "Subject must be at most {SUBJECT_MAX} characters"
            )));
        }
        if description.chars().count() < DESCRIPTION_MIN {
            return Err(invalid(format!(
                "Description must be at least {DESCRIPTION_MIN} characters"
            )));
        }
        let priority: TicketPriority = self
            .priority
            .trim()
            .parse()
            .map_err(|_| invalid("Please select a priority"))?;
        let department_id = Uuid::parse_str(self.department_id.trim())
            .map_err(|_| invalid("Please select a department"))?;

        Ok(NewTicket {
            subject: subject.to_string(),
            description: description.to_string(),
            priority,
            department_id,
            created_by,
            attachment,
        })
    }

    /// Reads a multipart body into form fields plus an optional validated file.
    /// A file input left empty by the browser counts as no attachment.
    pub async fn from_multipart(
        mut multipart: Multipart,
        uploads: &FileValidationConfig,
    ) -> Result<(Self, Option<UploadedFile>), StoreError> {
        let mut form = Self::default();
        let mut attachment = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| read_failure(e, uploads, "Malformed form data"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == ATTACHMENT_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| read_failure(e, uploads, "Failed to read the attachment"))?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                attachment = Some(check_attachment(file_name, &content_type, data, uploads)?);
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| read_failure(e, uploads, "Malformed form data"))?;
            match name.as_str() {
                "subject" => form.subject = value,
                "description" => form.description = value,
                "priority" => form.priority = value,
                "department_id" | "departmentId" => form.department_id = value,
                other => debug!("Ignoring unexpected form field {other}"),
            }
        }

        Ok((form, attachment))
    }
}

/// Runs the upload rules and wraps the file for the repository.
pub fn check_attachment(
    file_name: String,
    declared_type: &str,
    data: Bytes,
    uploads: &FileValidationConfig,
) -> Result<UploadedFile, StoreError> {
    let file_name = if file_name.trim().is_empty() {
        "attachment".to_string()
    } else {
        file_name
    };
    let result = validate_file_upload(&file_name, declared_type, &data, uploads);
    if !result.is_valid {
        let message = result.first_error().unwrap_or("Invalid attachment").to_string();
        return Err(invalid(message));
    }
    Ok(UploadedFile {
        file_name,
        content_type: result.content_type,
        data,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

impl StatusForm {
    pub fn parse(&self) -> Result<TicketStatus, StoreError> {
        self.status
            .trim()
            .parse()
            .map_err(|_| invalid(format!("Unknown status '{}'", self.status.trim())))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignForm {
    #[serde(alias = "assigneeId", alias = "assigned_to")]
    pub assignee_id: String,
}

impl AssignForm {
    pub fn parse(&self) -> Result<Uuid, StoreError> {
        Uuid::parse_str(self.assignee_id.trim()).map_err(|_| invalid("Please select an assignee"))
    }
}

/// HTML checkboxes send `on` when ticked and nothing otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "isInternal")]
    pub is_internal: Option<String>,
}

impl CommentForm {
    pub fn internal_requested(&self) -> bool {
        matches!(
            self.is_internal.as_deref().map(str::trim),
            Some("on" | "true" | "1")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(subject: &str, description: &str, priority: &str, department: &str) -> NewTicketForm {
        NewTicketForm {
            subject: subject.to_string(),
            description: description.to_string(),
            priority: priority.to_string(),
            department_id: department.to_string(),
        }
    }

    fn message(err: StoreError) -> String {
        match err {
            StoreError::Validation(message) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_ticket_form() {
        let department = Uuid::new_v4();
        let creator = Uuid::new_v4();
        let ticket = form(
            "  Cannot access email ",
            "Outlook keeps rejecting my password since Monday",
            "high",
            &department.to_string(),
        )
        .validate(creator, None)
        .expect("valid form");

        assert_eq!(ticket.subject, "Cannot access email");
        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.department_id, department);
        assert_eq!(ticket.created_by, creator);
    }

    #[test]
    fn test_ticket_form_rules() {
        let department = Uuid::new_v4().to_string();
        let long_enough = "A description with more than twenty characters";
        let creator = Uuid::new_v4();

        let err = form("Help", long_enough, "low", &department).validate(creator, None);
        assert_eq!(message(err.unwrap_err()), "Subject must be at least 5 characters");

        let err = form(&"x".repeat(101), long_enough, "low", &department).validate(creator, None);
        assert_eq!(message(err.unwrap_err()), "Subject must be at most 100 characters");

        let err = form("Printer jam", "too short", "low", &department).validate(creator, None);
        assert_eq!(message(err.unwrap_err()), "Description must be at least 20 characters");

        let err = form("Printer jam", long_enough, "urgent", &department).validate(creator, None);
        assert_eq!(message(err.unwrap_err()), "Please select a priority");

        let err = form("Printer jam", long_enough, "low", "").validate(creator, None);
        assert_eq!(message(err.unwrap_err()), "Please select a department");
    }

    #[test]
    fn test_attachment_check() {
        let config = FileValidationConfig::default();
        let file = check_attachment(
            "error.log.txt".to_string(),
            "text/plain",
            Bytes::from_static(b"stack trace"),
            &config,
        )
        .expect("valid attachment");
        assert_eq!(file.content_type, "text/plain");
        assert_eq!(file.size(), 11);

        let err = check_attachment(
            "movie.mp4".to_string(),
            "video/mp4",
            Bytes::from_static(b"\x00\x00\x00\x18ftyp"),
            &config,
        )
        .unwrap_err();
        assert_eq!(message(err), "File type must be JPEG, PNG, PDF, or TXT");
    }

    #[test]
    fn test_status_and_assign_parsing() {
        let status = StatusForm {
            status: "resolved".to_string(),
        };
        assert_eq!(status.parse().expect("status"), TicketStatus::Resolved);
        assert!(StatusForm {
            status: "reopened".to_string()
        }
        .parse()
        .is_err());

        let id = Uuid::new_v4();
        let assign = AssignForm {
            assignee_id: id.to_string(),
        };
        assert_eq!(assign.parse().expect("assignee"), id);
    }

    #[test]
    fn test_comment_checkbox() {
        let ticked = CommentForm {
            content: "Checked the logs".to_string(),
            is_internal: Some("on".to_string()),
        };
        assert!(ticked.internal_requested());
        assert!(!CommentForm::default().internal_requested());
    }

    #[test]
    fn test_body_limit_leaves_room_past_the_file_limit() {
        let uploads = FileValidationConfig::default();
        let limit = upload_body_limit(&uploads);
        assert!(limit > uploads.max_size + 1);
        assert_eq!(limit - uploads.max_size, FORM_OVERHEAD_BYTES);

        let small = FileValidationConfig {
            max_size: 1024,
            ..FileValidationConfig::default()
        };
        assert_eq!(upload_body_limit(&small), 1024 + FORM_OVERHEAD_BYTES);
    }
}
