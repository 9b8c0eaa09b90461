use crate::config::AuthSettings;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_cookie_name: String,
    pub secure_cookie: bool,
    pub session_max_age_secs: i64,
    /// Paths served without looking up a session at all.
    pub public_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "helpdesk_session".to_string(),
            secure_cookie: false,
            session_max_age_secs: 12 * 60 * 60,
            public_paths: vec![
                "/static".to_string(),
                "/favicon.ico".to_string(),
                "/api/health".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            session_cookie_name: settings.cookie_name.clone(),
            secure_cookie: settings.secure_cookie,
            session_max_age_secs: settings.session_hours * 60 * 60,
            ..Self::default()
        }
    }

    pub fn add_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.push(path.into());
        self
    }

    pub fn is_public_path(&self, path: &str) -> bool {
        for public_path in &self.public_paths {
            if path == public_path || path.starts_with(&format!("{}/", public_path)) {
                return true;
            }
        }
        false
    }
}
