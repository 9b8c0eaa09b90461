use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::core::shared::enums::Role;
use crate::core::shared::models::User;
use crate::security::auth_api::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub session_hours: i64,
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "helpdesk".into(),
            audience: "helpdesk-web".into(),
            session_hours: 12,
            leeway_seconds: 30,
        }
    }
}

impl JwtConfig {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            issuer: settings.issuer.clone(),
            session_hours: settings.session_hours,
            ..Self::default()
        }
    }
}

/// Session token payload. The role is informational only; every request
/// re-reads the profile so the stored role always wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub jti: String,
    pub email: String,
    pub role: Role,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID in claims: {e}"))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    revoked: Arc<RwLock<HashSet<String>>>,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(config: JwtConfig, secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(anyhow!("JWT secret must not be empty"));
        }
        Ok(Self {
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            revoked: Arc::new(RwLock::new(HashSet::new())),
        })
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self> {
        Self::new(JwtConfig::from_settings(settings), &settings.jwt_secret)
    }

    pub fn issue_session(&self, user: &User) -> Result<SessionToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.session_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            role: user.role,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to encode session token: {e}"))?;
        debug!("Issued session token for user {}", user.id);
        Ok(SessionToken {
            token,
            token_type: "Bearer".into(),
            expires_in: self.config.session_hours * 60 * 60,
            expires_at,
        })
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = self.config.leeway_seconds;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => {
                    debug!("Rejected session token: {e}");
                    AuthError::InvalidToken
                }
            })
    }

    /// Decodes and rejects tokens revoked by logout.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token)?;
        if self.is_revoked(&claims.jti).await {
            return Err(AuthError::SessionExpired);
        }
        Ok(claims)
    }

    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.decode(token)?;
        self.revoked.write().await.insert(claims.jti.clone());
        debug!("Revoked session {}", claims.jti);
        Ok(())
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().await.contains(jti)
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
