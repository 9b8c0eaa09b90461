use serde::Deserialize;
use uuid::Uuid;

use crate::core::shared::utils::normalize_email;
use crate::core::store::StoreError;
use crate::security::password::validate_password;

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Validation(message.into())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default, alias = "departmentId")]
    pub department_id: String,
}

/// Registration input that passed every field rule.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department_id: Uuid,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, StoreError> {
        let name = self.name.trim();
        let email = normalize_email(&self.email);
        if name.is_empty()
            || email.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
            || self.department_id.trim().is_empty()
        {
            return Err(invalid("All fields are required"));
        }
        if !email.contains('@') {
            return Err(invalid("Invalid email address"));
        }
        if let Some(issue) = validate_password(&self.password).first() {
            return Err(invalid(issue.message()));
        }
        if self.password != self.confirm_password {
            return Err(invalid("Passwords do not match"));
        }
        let department_id = Uuid::parse_str(self.department_id.trim())
            .map_err(|_| invalid("Please select your department"))?;

        Ok(Registration {
            name: name.to_string(),
            email,
            password: self.password.clone(),
            department_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<String, StoreError> {
        let email = normalize_email(&self.email);
        if email.is_empty() || self.password.is_empty() {
            return Err(invalid("Email and password are required"));
        }
        Ok(email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "departmentId")]
    pub department_id: Option<String>,
}

impl SettingsForm {
    /// An empty department choice clears the department.
    pub fn validate(&self) -> Result<(String, Option<Uuid>), StoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("Name is required"));
        }
        let department_id = match self.department_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw).map_err(|_| invalid("Please select a valid department"))?,
            ),
        };
        Ok((name.to_string(), department_id))
    }
}
