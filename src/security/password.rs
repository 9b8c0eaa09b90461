use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 128,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19456,
            time_cost: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordIssue {
    Empty,
    TooShort { min: usize, actual: usize },
    TooLong { max: usize, actual: usize },
}

impl PasswordIssue {
    pub fn message(&self) -> String {
        match self {
            Self::Empty => "Password is required".to_string(),
            Self::TooShort { min, .. } => {
                format!("Password must be at least {min} characters")
            }
            Self::TooLong { max, .. } => {
                format!("Password must be at most {max} characters")
            }
        }
    }
}

pub struct CredentialHasher {
    argon2: Argon2<'static>,
    config: PasswordConfig,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    pub fn new(argon2_config: Argon2Config, password_config: PasswordConfig) -> Result<Self> {
        let params = Params::new(
            argon2_config.memory_cost_kib,
            argon2_config.time_cost,
            argon2_config.parallelism,
            Some(argon2_config.output_length),
        )
        .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self {
            argon2,
            config: password_config,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(Argon2Config::default(), PasswordConfig::default())
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {e}")),
        }
    }

    /// Length rules only. Registration adds the confirmation check.
    pub fn validate(&self, password: &str) -> Vec<PasswordIssue> {
        let length = password.chars().count();
        let mut issues = Vec::new();
        if length == 0 {
            issues.push(PasswordIssue::Empty);
        } else if length < self.config.min_length {
            issues.push(PasswordIssue::TooShort {
                min: self.config.min_length,
                actual: length,
            });
        }
        if length > self.config.max_length {
            issues.push(PasswordIssue::TooLong {
                max: self.config.max_length,
                actual: length,
            });
        }
        issues
    }

    pub fn config(&self) -> &PasswordConfig {
        &self.config
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let hasher = CredentialHasher::with_defaults()?;
    hasher.hash(password)
}

/// A malformed stored hash counts as a mismatch so login stays generic.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let hasher = match CredentialHasher::with_defaults() {
        Ok(h) => h,
        Err(e) => {
            warn!("Failed to create password hasher: {e}");
            return false;
        }
    };
    match hasher.verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}

pub fn validate_password(password: &str) -> Vec<PasswordIssue> {
    match CredentialHasher::with_defaults() {
        Ok(hasher) => hasher.validate(password),
        Err(e) => {
            warn!("Failed to create password hasher: {e}");
            Vec::new()
        }
    }
}
